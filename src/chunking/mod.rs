//! Transcript chunking for retrieval.
//!
//! Splits a transcript's full text into overlapping chunks and records where
//! each chunk sits in the text and in the video.

mod recursive;

pub use recursive::{RecursiveTextSplitter, DEFAULT_SEPARATORS};

use crate::config::ChunkingSettings;
use crate::error::Result;
use crate::transcript::{format_timestamp, Transcript};
use serde::{Deserialize, Serialize};

/// A contiguous slice of a transcript, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Position of this chunk in the transcript (0-based).
    pub order: usize,
    /// Chunk text; a substring of the transcript's full text.
    pub content: String,
    /// Byte offset of `content` within the full text.
    pub byte_offset: usize,
    /// Video time at which the chunk's first caption starts.
    pub start_seconds: f64,
}

impl TextChunk {
    /// Format the start time for display.
    pub fn format_timestamp(&self) -> String {
        format_timestamp(self.start_seconds)
    }
}

/// Build a splitter from the chunking settings.
pub fn splitter_from_settings(settings: &ChunkingSettings) -> Result<RecursiveTextSplitter> {
    RecursiveTextSplitter::new(settings.chunk_size, settings.chunk_overlap)
}

/// Split a transcript into ordered chunks.
pub fn chunk_transcript(transcript: &Transcript, splitter: &RecursiveTextSplitter) -> Vec<TextChunk> {
    let text = &transcript.full_text;
    let mut cursor = 0;

    splitter
        .split_text(text)
        .into_iter()
        .enumerate()
        .map(|(order, content)| {
            let byte_offset = text[cursor..]
                .find(&content)
                .map(|i| cursor + i)
                .or_else(|| text.find(&content))
                .unwrap_or(cursor);
            cursor = byte_offset + content.chars().next().map(char::len_utf8).unwrap_or(0);

            TextChunk {
                order,
                start_seconds: transcript.start_seconds_at(byte_offset),
                byte_offset,
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    #[test]
    fn test_chunk_transcript_offsets_and_times() {
        let transcript = Transcript::new(
            "test".to_string(),
            "en",
            vec![
                TranscriptSegment::new(0.0, 3.0, "abc def".to_string()),
                TranscriptSegment::new(30.0, 3.0, "ghi jkl".to_string()),
            ],
        );
        let splitter = RecursiveTextSplitter::new(10, 5).unwrap();

        let chunks = chunk_transcript(&transcript, &splitter);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "abc def");
        assert_eq!(chunks[0].byte_offset, 0);
        assert_eq!(chunks[0].start_seconds, 0.0);

        assert_eq!(chunks[1].content, "def ghi");
        assert_eq!(chunks[1].byte_offset, 4);
        assert_eq!(chunks[1].start_seconds, 0.0);

        assert_eq!(chunks[2].content, "ghi jkl");
        assert_eq!(chunks[2].byte_offset, 8);
        assert_eq!(chunks[2].start_seconds, 30.0);
        assert_eq!(chunks[2].format_timestamp(), "00:30");

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.order, i);
            assert!(transcript.full_text[chunk.byte_offset..].starts_with(&chunk.content));
        }
    }

    #[test]
    fn test_repeated_content_gets_increasing_offsets() {
        let transcript = Transcript::new(
            "test".to_string(),
            "en",
            vec![TranscriptSegment::new(0.0, 1.0, "la la la la la la".to_string())],
        );
        let splitter = RecursiveTextSplitter::new(6, 3).unwrap();

        let chunks = chunk_transcript(&transcript, &splitter);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            assert!(pair[1].byte_offset > pair[0].byte_offset);
        }
    }

    #[test]
    fn test_settings_defaults_build_a_splitter() {
        let splitter = splitter_from_settings(&ChunkingSettings::default()).unwrap();
        assert_eq!(splitter.chunk_size(), 1000);
        assert_eq!(splitter.chunk_overlap(), 200);
    }
}
