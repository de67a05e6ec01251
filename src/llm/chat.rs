//! Chat-completions backed language model.

use super::{LanguageModel, Prompt};
use crate::config::GenerationSettings;
use crate::error::{Result, VidQaError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Language model reached through an OpenAI-compatible chat-completions API.
pub struct ChatCompletionModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionModel {
    /// Create a model client from the generation settings.
    pub fn from_settings(settings: &GenerationSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.api_base, &settings.api_key_env, timeout)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionModel {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.clone())
                .build()
                .map_err(|e| VidQaError::GenerationFailure(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.clone())
                .build()
                .map_err(|e| VidQaError::GenerationFailure(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| VidQaError::GenerationFailure(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            VidQaError::GenerationFailure(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| VidQaError::GenerationFailure("Empty response from model".to_string()))?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
