//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, VidQaError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from the embedding settings.
    pub fn from_settings(settings: &EmbeddingSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.api_base, &settings.api_key_env, timeout)?,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            batch_size: settings.batch_size.max(1),
        })
    }
}

/// The `dimensions` request parameter, sent only to models that can shorten
/// their vectors. Older models and most compatible servers reject it.
fn requested_dimensions(model: &str, dimensions: usize) -> Option<u32> {
    let model = model.rsplit('/').next().unwrap_or(model);
    model
        .starts_with("text-embedding-3")
        .then_some(dimensions as u32)
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VidQaError::EmbeddingFailure("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if let Some(dimensions) = requested_dimensions(&self.model, self.dimensions) {
                args.dimensions(dimensions);
            }
            let request = args
                .build()
                .map_err(|e| VidQaError::EmbeddingFailure(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| VidQaError::EmbeddingFailure(format!("Embedding API error: {}", e)))?;

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_only_sent_to_models_that_support_it() {
        assert_eq!(requested_dimensions("text-embedding-3-small", 512), Some(512));
        assert_eq!(requested_dimensions("openai/text-embedding-3-large", 1024), Some(1024));
        assert_eq!(requested_dimensions("text-embedding-ada-002", 1536), None);
        assert_eq!(requested_dimensions("nomic-embed-text", 768), None);
    }
}
