//! Transcript retrieval for YouTube videos.
//!
//! Parses user-supplied video references and fetches caption transcripts in
//! one of the supported languages.

mod models;
mod reference;
mod youtube;

pub use models::{format_timestamp, Transcript, TranscriptSegment};
pub use reference::{extract_video_id, VideoReference};
pub use youtube::{parse_timedtext, YoutubeTranscriptFetcher};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the transcript of a video in the first available language of `languages`.
    ///
    /// Fails with `InvalidVideoReference` when the video does not exist and
    /// `TranscriptUnavailable` when it has no usable captions.
    async fn fetch(&self, video: &VideoReference, languages: &[String]) -> Result<Transcript>;
}
