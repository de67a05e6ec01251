//! Vector store abstraction for vidqa.
//!
//! A store holds the embedded chunks of exactly one processed video and
//! answers nearest-neighbour queries over them.

mod memory;

pub use memory::MemoryVectorStore;

use crate::chunking::TextChunk;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A chunk stored in the vector index together with its embedding.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Video ID this document belongs to.
    pub video_id: String,
    /// The source chunk.
    pub chunk: TextChunk,
    /// Embedding vector.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(video_id: String, chunk: TextChunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            chunk,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert documents, replacing any with the same chunk order.
    async fn upsert_batch(&mut self, docs: Vec<Document>) -> Result<usize>;

    /// Return the `limit` most similar documents, best first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;

    /// Dimension every stored vector has.
    fn dimensions(&self) -> usize;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
