//! Pre-flight checks before expensive operations.
//!
//! Validates that required API tokens are available before starting
//! operations that would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{Result, VidQaError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Fetching a transcript needs no credentials.
    Transcript,
    /// Search embeds the transcript and the query.
    Search,
    /// Asking questions embeds and generates.
    Ask,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcript => {}
        Operation::Search => {
            check_embedding_token(settings)?;
        }
        Operation::Ask => {
            check_embedding_token(settings)?;
            check_api_key(&settings.generation.api_key_env, &[])?;
        }
    }
    Ok(())
}

fn check_embedding_token(settings: &Settings) -> Result<()> {
    match settings.embedding.provider {
        EmbeddingProvider::HuggingFace => check_api_key(&settings.embedding.api_key_env, &["HF_TOKEN"]),
        EmbeddingProvider::OpenAI => check_api_key(&settings.embedding.api_key_env, &[]),
    }
}

/// Check that an API key variable (or one of its fallbacks) is set.
fn check_api_key(var: &str, fallbacks: &[&str]) -> Result<()> {
    let found = std::iter::once(var)
        .chain(fallbacks.iter().copied())
        .any(|name| std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false));

    if found {
        Ok(())
    } else {
        Err(VidQaError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        )))
    }
}
