//! Caller-owned session state.
//!
//! A [`Session`] holds at most one processed video and the conversation about
//! it. Front ends create and own sessions; pipeline operations borrow them.

mod export;
mod history;

pub use export::{export_history, ExportFormat};
pub use history::{ConversationHistory, ConversationTurn};

use crate::chunking::TextChunk;
use crate::embedding::Embedder;
use crate::transcript::{Transcript, VideoReference};
use crate::vector_store::VectorStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Metadata about the processed video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: Option<String>,
    /// Human-readable transcript language.
    pub language: String,
    pub language_code: String,
    /// Captions came from speech recognition.
    pub is_generated: bool,
    /// Transcript was machine-translated.
    pub translated: bool,
    /// Transcript length in characters.
    pub transcript_chars: usize,
    pub chunk_count: usize,
    /// Model that embedded the chunks.
    pub embedding_model: String,
    pub processed_at: DateTime<Utc>,
}

/// A processed video: its chunks, their index, and the embedder that built it.
///
/// Questions against this video must be embedded by the same embedder, so it
/// travels with the index rather than being chosen per call.
pub struct VideoSession {
    video: VideoReference,
    info: VideoInfo,
    chunks: Vec<TextChunk>,
    index: Box<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl VideoSession {
    pub(crate) fn new(
        video: VideoReference,
        transcript: &Transcript,
        chunks: Vec<TextChunk>,
        index: Box<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let info = VideoInfo {
            video_id: video.video_id().to_string(),
            title: transcript.title.clone(),
            language: transcript.language.clone(),
            language_code: transcript.language_code.clone(),
            is_generated: transcript.is_generated,
            translated: transcript.translated,
            transcript_chars: transcript.char_count(),
            chunk_count: chunks.len(),
            embedding_model: embedder.model_id().to_string(),
            processed_at: Utc::now(),
        };

        Self {
            video,
            info,
            chunks,
            index,
            embedder,
        }
    }

    pub fn video(&self) -> &VideoReference {
        &self.video
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Chunks in transcript order.
    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn index(&self) -> &dyn VectorStore {
        self.index.as_ref()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

impl std::fmt::Debug for VideoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSession")
            .field("info", &self.info)
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

/// One user's conversation with at most one video.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    video: Option<VideoSession>,
    history: ConversationHistory,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            video: None,
            history: ConversationHistory::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The processed video, if any.
    pub fn video(&self) -> Option<&VideoSession> {
        self.video.as_ref()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Whether questions can be asked.
    pub fn is_ready(&self) -> bool {
        self.video.is_some()
    }

    /// Drop the video and the conversation.
    pub fn reset(&mut self) {
        self.video = None;
        self.history.clear();
    }

    /// Install a newly processed video, replacing the previous one.
    ///
    /// The conversation is cleared because it was about the old video.
    pub(crate) fn replace_video(&mut self, video: VideoSession) {
        self.video = Some(video);
        self.history.clear();
    }

    pub(crate) fn history_mut(&mut self) -> &mut ConversationHistory {
        &mut self.history
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
