//! Hugging Face feature-extraction embeddings.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, VidQaError};
use crate::openai::http_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Environment variable consulted when the configured one is unset.
const FALLBACK_TOKEN_ENV: &str = "HF_TOKEN";

/// Embedder backed by the Hugging Face inference `feature-extraction` pipeline.
pub struct HuggingFaceEmbedder {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Sentence models return one vector per input; token-level models return one per token.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Pooled(Vec<Vec<f32>>),
    Tokens(Vec<Vec<Vec<f32>>>),
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

impl HuggingFaceEmbedder {
    /// Create an embedder from the embedding settings.
    pub fn from_settings(settings: &EmbeddingSettings, timeout: Duration) -> Result<Self> {
        let token = std::env::var(&settings.api_key_env)
            .or_else(|_| std::env::var(FALLBACK_TOKEN_ENV))
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!(
                "{}/{}/pipeline/feature-extraction",
                settings.api_base.trim_end_matches('/'),
                settings.model
            ),
            token,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            batch_size: settings.batch_size.max(1),
        })
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&FeatureExtractionRequest { inputs });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VidQaError::EmbeddingFailure(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VidQaError::EmbeddingFailure(format!("Failed to read embedding response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(VidQaError::EmbeddingFailure(format!(
                "Embedding API returned {}: {}",
                status, message
            )));
        }

        parse_embeddings(&body)
    }
}

/// Parse a feature-extraction response, mean-pooling token vectors when needed.
fn parse_embeddings(body: &str) -> Result<Vec<Vec<f32>>> {
    let parsed: FeatureExtractionResponse = serde_json::from_str(body)
        .map_err(|e| VidQaError::EmbeddingFailure(format!("Unexpected embedding response: {}", e)))?;

    match parsed {
        FeatureExtractionResponse::Pooled(vectors) => Ok(vectors),
        FeatureExtractionResponse::Tokens(inputs) => inputs.iter().map(|tokens| mean_pool(tokens)).collect(),
    }
}

fn mean_pool(tokens: &[Vec<f32>]) -> Result<Vec<f32>> {
    let width = tokens
        .first()
        .map(Vec::len)
        .ok_or_else(|| VidQaError::EmbeddingFailure("Empty token embeddings".to_string()))?;

    let mut pooled = vec![0.0f32; width];
    for token in tokens {
        if token.len() != width {
            return Err(VidQaError::EmbeddingFailure(
                "Token embeddings have inconsistent widths".to_string(),
            ));
        }
        for (sum, value) in pooled.iter_mut().zip(token) {
            *sum += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    Ok(pooled)
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VidQaError::EmbeddingFailure("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if self.token.is_none() {
            warn!("No Hugging Face token set; the request will likely be rejected");
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.request(batch).await?;
            if vectors.len() != batch.len() {
                return Err(VidQaError::EmbeddingFailure(format!(
                    "Requested {} embeddings, received {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            all_embeddings.extend(vectors);
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
    fn test_endpoint_from_settings() {
        let embedder =
            HuggingFaceEmbedder::from_settings(&EmbeddingSettings::default(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            embedder.endpoint,
            "https://router.huggingface.co/hf-inference/models/sentence-transformers/paraphrase-multilingual-mpnet-base-v2/pipeline/feature-extraction"
        );
    }

    #[test]
    fn test_parse_pooled_vectors() {
        let vectors = parse_embeddings("[[0.1, 0.2], [0.3, 0.4]]").unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_parse_token_vectors_mean_pools() {
        let vectors = parse_embeddings("[[[1.0, 2.0], [3.0, 4.0]]]").unwrap();
        assert_eq!(vectors, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_parse_garbage_is_embedding_failure() {
        assert!(matches!(
            parse_embeddings(r#"{"error": "Model is loading"}"#),
            Err(VidQaError::EmbeddingFailure(_))
        ));
    }
}
