//! Configuration settings for vidqa.

use crate::error::{Result, VidQaError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcript: TranscriptSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
    /// Timeout for every outbound HTTP request, in seconds.
    pub http_timeout_seconds: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            http_timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Supported caption languages, in priority order.
    pub languages: Vec<String>,
    /// Translate the first available track when none is in a supported language.
    pub translate_fallback: bool,
    /// Target language code for the translation fallback.
    pub translation_target: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec![
                "hi".to_string(),
                "en".to_string(),
                "en-IN".to_string(),
                "hi-IN".to_string(),
            ],
            translate_fallback: true,
            translation_target: "en".to_string(),
        }
    }
}

impl TranscriptSettings {
    /// Language preference list for a request.
    ///
    /// A declared preference must belong to the supported set; it is tried
    /// first, followed by the remaining supported languages in order.
    pub fn preference_order(&self, preferred: Option<&str>) -> Result<Vec<String>> {
        let Some(preferred) = preferred else {
            return Ok(self.languages.clone());
        };

        if !self.languages.iter().any(|l| l.eq_ignore_ascii_case(preferred)) {
            return Err(VidQaError::InvalidInput(format!(
                "Unsupported transcript language '{}'. Supported: {}",
                preferred,
                self.languages.join(", ")
            )));
        }

        let mut order = vec![preferred.to_string()];
        order.extend(
            self.languages
                .iter()
                .filter(|l| !l.eq_ignore_ascii_case(preferred))
                .cloned(),
        );
        Ok(order)
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Hugging Face inference feature-extraction endpoint.
    #[default]
    HuggingFace,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(EmbeddingProvider::HuggingFace),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::HuggingFace => write!(f, "huggingface"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (huggingface, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Base URL of the provider API.
    pub api_base: String,
    /// Environment variable holding the API token.
    pub api_key_env: String,
    /// Texts per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: "sentence-transformers/paraphrase-multilingual-mpnet-base-v2".to_string(),
            dimensions: 768,
            api_base: "https://router.huggingface.co/hf-inference/models".to_string(),
            api_key_env: "HUGGINGFACEHUB_API_TOKEN".to_string(),
            batch_size: 32,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Minimum cosine similarity for search results (answering ignores it).
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            min_score: 0.0,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub api_base: String,
    /// Environment variable holding the API token.
    pub api_key_env: String,
    /// Chat model to use.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in a generated answer.
    pub max_tokens: u32,
    /// Language every answer is written in.
    pub response_language: String,
    /// Most recent turns rendered into the prompt.
    pub max_history_turns: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_base: "https://router.huggingface.co/v1".to_string(),
            api_key_env: "HUGGINGFACEHUB_API_TOKEN".to_string(),
            model: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            response_language: "English".to_string(),
            max_history_turns: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// Keys that may be set even though they are missing from a serialized default.
const OPTIONAL_KEYS: &[&str] = &["prompts.custom_dir"];

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(VidQaError::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(VidQaError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.transcript.languages.is_empty() {
            return Err(VidQaError::Config(
                "transcript.languages must list at least one language".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(VidQaError::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(VidQaError::Config(
                "embedding.dimensions and embedding.batch_size must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(VidQaError::Config(format!(
                "generation.temperature ({}) must be between 0 and 2",
                self.generation.temperature
            )));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidQaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Return a copy with one dotted key (e.g. "retrieval.top_k") replaced.
    ///
    /// The value is parsed as a TOML literal, falling back to a plain string.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self> {
        let mut doc = toml::Value::try_from(self).map_err(|e| VidQaError::Config(e.to_string()))?;

        let parsed = toml::from_str::<toml::Table>(&format!("v = {}", value))
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| toml::Value::String(value.to_string()));

        // Unset optional keys and prompt variables are absent from the serialized form
        let may_add = OPTIONAL_KEYS.contains(&key) || key.starts_with("prompts.variables.");

        let mut parts = key.split('.').peekable();
        let mut node = &mut doc;
        while let Some(part) = parts.next() {
            let table = node
                .as_table_mut()
                .ok_or_else(|| VidQaError::Config(format!("'{}' is not a section", key)))?;
            if parts.peek().is_none() {
                if !may_add && !table.contains_key(part) {
                    return Err(VidQaError::Config(format!("Unknown config key: {}", key)));
                }
                table.insert(part.to_string(), parsed.clone());
                break;
            }
            node = table
                .get_mut(part)
                .ok_or_else(|| VidQaError::Config(format!("Unknown config key: {}", key)))?;
        }

        let updated: Settings = doc
            .try_into()
            .map_err(|e: toml::de::Error| VidQaError::Config(e.to_string()))?;
        updated.validate()?;
        Ok(updated)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Timeout applied to outbound HTTP requests.
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.general.http_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.retrieval.top_k, 4);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::HuggingFace);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut settings = Settings::default();
        settings.chunking.chunk_overlap = 1000;
        assert!(matches!(settings.validate(), Err(VidQaError::Config(_))));
    }

    #[test]
    fn test_preference_order() {
        let transcript = TranscriptSettings::default();

        assert_eq!(transcript.preference_order(None).unwrap(), transcript.languages);

        let order = transcript.preference_order(Some("en")).unwrap();
        assert_eq!(order, vec!["en", "hi", "en-IN", "hi-IN"]);

        assert!(matches!(
            transcript.preference_order(Some("fr")),
            Err(VidQaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            top_k = 6

            [embedding]
            provider = "openai"
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.top_k, 6);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAI);
        assert_eq!(settings.chunking.chunk_size, 1000);
    }

    #[test]
    fn test_with_value() {
        let settings = Settings::default();

        let updated = settings.with_value("retrieval.top_k", "7").unwrap();
        assert_eq!(updated.retrieval.top_k, 7);

        let updated = settings.with_value("generation.model", "gpt-4o-mini").unwrap();
        assert_eq!(updated.generation.model, "gpt-4o-mini");

        assert!(settings.with_value("retrieval.nope", "1").is_err());
        assert!(settings.with_value("chunking.chunk_overlap", "5000").is_err());
    }

    #[test]
    fn test_with_value_sets_optional_keys() {
        let settings = Settings::default();
        assert!(settings.prompts.custom_dir.is_none());

        let updated = settings.with_value("prompts.custom_dir", "~/p").unwrap();
        assert_eq!(updated.prompts.custom_dir.as_deref(), Some("~/p"));

        let updated = updated.with_value("prompts.variables.channel", "Cats Daily").unwrap();
        assert_eq!(updated.prompts.variables.get("channel").map(String::as_str), Some("Cats Daily"));

        assert!(settings.with_value("prompts.nope", "x").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.top_k = 8;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.retrieval.top_k, 8);
    }
}
