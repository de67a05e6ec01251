//! Client construction for OpenAI-compatible endpoints.
//!
//! The same chat-completions client serves OpenAI itself and any compatible
//! router (the Hugging Face router by default), selected by `api_base`.

use crate::error::{Result, VidQaError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Build the shared HTTP client with the given timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidQaError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Create a client for an OpenAI-compatible endpoint.
///
/// `api_key_env` names the environment variable holding the key; an unset
/// variable leaves the key empty so the endpoint reports the auth error.
pub fn create_client(
    api_base: &str,
    api_key_env: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(api_key_env).unwrap_or_default();
    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client(timeout)?))
}
