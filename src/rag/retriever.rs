//! Retrieval of the chunks most relevant to a question.

use super::ContextChunk;
use crate::error::{Result, VidQaError};
use crate::session::Session;
use tracing::{debug, instrument};

/// Finds the top-K chunks of a session's video for a query.
///
/// Queries are embedded with the embedder bound to the session's video, so
/// the query and the index always share one embedding space.
#[derive(Debug, Clone)]
pub struct Retriever {
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning `top_k` chunks by default.
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Retrieve the `k` (or default) most similar chunks, best first.
    ///
    /// `k` is clamped to the number of chunks; equal scores keep transcript order.
    pub async fn retrieve(&self, session: &Session, query: &str, k: Option<usize>) -> Result<Vec<ContextChunk>> {
        self.search(session, query, k, None).await
    }

    /// Like [`retrieve`](Self::retrieve), dropping results below `min_score`.
    #[instrument(skip(self, session), fields(video_id = tracing::field::Empty))]
    pub async fn search(
        &self,
        session: &Session,
        query: &str,
        k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ContextChunk>> {
        let video = session.video().ok_or(VidQaError::EmptyIndex)?;
        tracing::Span::current().record("video_id", video.video().video_id());

        if query.trim().is_empty() {
            return Err(VidQaError::InvalidInput("Question must not be empty".to_string()));
        }

        let k = k.unwrap_or(self.top_k);
        if k == 0 {
            return Err(VidQaError::InvalidInput("k must be at least 1".to_string()));
        }

        let index = video.index();
        let available = index.document_count().await?;
        if available == 0 {
            return Err(VidQaError::EmptyIndex);
        }
        let k = k.min(available);

        let query_embedding = video.embedder().embed(query).await?;

        let results = match min_score {
            Some(min_score) => index.search_with_threshold(&query_embedding, k, min_score).await?,
            None => index.search(&query_embedding, k).await?,
        };

        debug!("Retrieved {} of {} chunks", results.len(), available);

        Ok(results
            .into_iter()
            .map(|r| ContextChunk::from_result(video.video(), r))
            .collect())
    }
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(4)
    }
}
