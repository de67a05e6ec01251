//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! The retriever finds the transcript chunks closest to a question and the
//! generator turns them, plus the running conversation, into an answer.

mod generator;
pub mod retriever;

pub use generator::AnswerGenerator;
pub use retriever::Retriever;

use crate::transcript::VideoReference;
use crate::vector_store::SearchResult;
use serde::{Deserialize, Serialize};

/// A retrieved chunk prepared for prompting and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Position of the chunk in the transcript.
    pub order: usize,
    /// Formatted timestamp (e.g., "02:34").
    pub timestamp: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
    /// Watch URL starting at the chunk.
    pub url: String,
}

impl ContextChunk {
    /// Build a context chunk from a search result on the given video.
    pub fn from_result(video: &VideoReference, result: SearchResult) -> Self {
        let chunk = result.document.chunk;
        Self {
            order: chunk.order,
            timestamp: chunk.format_timestamp(),
            start_seconds: chunk.start_seconds,
            url: video.url_at(chunk.start_seconds),
            content: chunk.content,
            score: result.score,
        }
    }
}

/// An answer together with the chunks it was generated from.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            output.push_str(&format_context_for_display(&self.sources));
        }

        output
    }
}

/// Format context chunks for the prompt: contents in order, separated by blank lines.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("[{}] {}", chunk.timestamp, chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format context chunks for display to the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "#{} @ {} (score: {:.2})\n  {}",
                chunk.order + 1,
                chunk.timestamp,
                chunk.score,
                chunk.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
