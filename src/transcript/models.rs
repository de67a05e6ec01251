//! Data models for video transcripts.

use serde::{Deserialize, Serialize};

/// A complete transcript of one video in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Video title, when the source reports one.
    pub title: Option<String>,
    /// Human-readable language name (e.g. "Hindi (auto-generated)").
    pub language: String,
    /// Language code of the transcript text (e.g. "hi").
    pub language_code: String,
    /// Whether the captions were generated by speech recognition.
    pub is_generated: bool,
    /// Whether the text was machine-translated from another language.
    pub translated: bool,
    /// Caption segments in playback order, whitespace-normalized.
    pub segments: Vec<TranscriptSegment>,
    /// Full transcript text (segments joined with single spaces).
    pub full_text: String,
}

impl Transcript {
    /// Create a transcript from raw caption segments.
    ///
    /// Segment text is whitespace-normalized and empty segments are dropped.
    pub fn new(video_id: String, language_code: &str, segments: Vec<TranscriptSegment>) -> Self {
        let segments: Vec<TranscriptSegment> = segments
            .into_iter()
            .filter_map(|s| {
                let text = s.text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!text.is_empty()).then(|| TranscriptSegment::new(s.start_seconds, s.duration_seconds, text))
            })
            .collect();

        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id,
            title: None,
            language: language_code.to_string(),
            language_code: language_code.to_string(),
            is_generated: false,
            translated: false,
            segments,
            full_text,
        }
    }

    /// Set the video title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set the display name of the language.
    pub fn with_language_name(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Mark the transcript as auto-generated.
    pub fn generated(mut self, is_generated: bool) -> Self {
        self.is_generated = is_generated;
        self
    }

    /// Mark the transcript as machine-translated.
    pub fn translated(mut self, translated: bool) -> Self {
        self.translated = translated;
        self
    }

    /// Whether the transcript has no text.
    pub fn is_empty(&self) -> bool {
        self.full_text.is_empty()
    }

    /// Length of the full text in characters.
    pub fn char_count(&self) -> usize {
        self.full_text.chars().count()
    }

    /// Playback time covered by the captions.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.start_seconds + s.duration_seconds)
            .unwrap_or(0.0)
    }

    /// Start time of the segment that contains the given byte offset of `full_text`.
    pub fn start_seconds_at(&self, byte_offset: usize) -> f64 {
        let mut segment_start = 0;
        let mut current = 0.0;
        for segment in &self.segments {
            if segment_start > byte_offset {
                break;
            }
            current = segment.start_seconds;
            segment_start += segment.text.len() + 1;
        }
        current
    }

    /// Format the transcript with timestamps for display.
    pub fn format_with_timestamps(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("[{}] {}", format_timestamp(s.start_seconds), s.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single caption line with timing information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// How long the line is shown, in seconds.
    pub duration_seconds: f64,
    /// Caption text.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start_seconds: f64, duration_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text,
        }
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
