//! Embedding generation for semantic search and retrieval.

mod huggingface;
mod openai;

pub use huggingface::HuggingFaceEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{Result, VidQaError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
///
/// Implementations must be deterministic: the same model and input text
/// always produce the same vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Identifier of the model producing the vectors.
    fn model_id(&self) -> &str;
}

/// Create the embedder selected by the settings.
pub fn create_embedder(settings: &EmbeddingSettings, timeout: Duration) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::HuggingFace => Arc::new(HuggingFaceEmbedder::from_settings(settings, timeout)?),
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::from_settings(settings, timeout)?),
    };
    Ok(embedder)
}

/// Check a batch of vectors before it is indexed.
pub fn validate_embeddings(vectors: &[Vec<f32>], expected_count: usize, dimensions: usize) -> Result<()> {
    if vectors.len() != expected_count {
        return Err(VidQaError::EmbeddingFailure(format!(
            "Expected {} embeddings, got {}",
            expected_count,
            vectors.len()
        )));
    }

    for (i, vector) in vectors.iter().enumerate() {
        if vector.len() != dimensions {
            return Err(VidQaError::EmbeddingFailure(format!(
                "Embedding {} has {} dimensions, expected {}",
                i,
                vector.len(),
                dimensions
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(VidQaError::EmbeddingFailure(format!(
                "Embedding {} contains NaN or infinite values",
                i
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_embeddings() {
        let good = vec![vec![0.1, 0.2], vec![0.3, 0.4]];
        assert!(validate_embeddings(&good, 2, 2).is_ok());

        assert!(matches!(
            validate_embeddings(&good, 3, 2),
            Err(VidQaError::EmbeddingFailure(_))
        ));
        assert!(validate_embeddings(&good, 2, 3).is_err());

        let nan = vec![vec![0.1, f32::NAN]];
        assert!(validate_embeddings(&nan, 1, 2).is_err());
    }

    #[test]
    fn test_create_embedder_follows_provider() {
        let timeout = Duration::from_secs(5);

        let embedder = create_embedder(&EmbeddingSettings::default(), timeout).unwrap();
        assert_eq!(embedder.dimensions(), 768);
        assert!(embedder.model_id().contains("multilingual"));

        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 100,
        };
        let embedder = create_embedder(&settings, timeout).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model_id(), "text-embedding-3-small");
    }
}
