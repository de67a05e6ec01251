//! In-memory vector store implementation.
//!
//! Brute-force cosine search; a single video's transcript is small enough
//! that scanning every chunk is fast.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::{Result, VidQaError};
use async_trait::async_trait;
use std::cmp::Ordering;

/// In-memory vector store.
#[derive(Debug, Clone)]
pub struct MemoryVectorStore {
    dimensions: usize,
    documents: Vec<Document>,
}

impl MemoryVectorStore {
    /// Create an empty store for vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            documents: Vec::new(),
        }
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(VidQaError::EmbeddingFailure(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(VidQaError::EmbeddingFailure(
                "Vector contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&mut self, docs: Vec<Document>) -> Result<usize> {
        for doc in &docs {
            self.check_vector(&doc.embedding)?;
        }

        let count = docs.len();
        for doc in docs {
            match self
                .documents
                .iter_mut()
                .find(|d| d.chunk.order == doc.chunk.order)
            {
                Some(existing) => *existing = doc,
                None => self.documents.push(doc),
            }
        }
        self.documents.sort_by_key(|d| d.chunk.order);

        Ok(count)
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::NEG_INFINITY)
            .await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        self.check_vector(query_embedding)?;

        let mut results: Vec<SearchResult> = self
            .documents
            .iter()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Best score first; equal scores keep transcript order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.document.chunk.order.cmp(&b.document.chunk.order))
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
