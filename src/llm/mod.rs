//! Language model access for answer generation.

mod chat;

pub use chat::ChatCompletionModel;

use crate::error::Result;
use async_trait::async_trait;

/// A fully rendered prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Trait for text generation backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the prompt.
    ///
    /// Fails with `GenerationFailure` when the model errors or returns no text.
    async fn generate(&self, prompt: &Prompt) -> Result<String>;

    /// Identifier of the model.
    fn model_id(&self) -> &str;
}
