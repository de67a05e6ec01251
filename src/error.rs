//! Error types for vidqa.

use thiserror::Error;

/// Library-level error type for vidqa operations.
#[derive(Error, Debug)]
pub enum VidQaError {
    #[error("Invalid video reference: {0}")]
    InvalidVideoReference(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailure(String),

    #[error("No video has been processed yet. Process a video before asking questions.")]
    EmptyIndex,

    #[error("Answer generation failed: {0}")]
    GenerationFailure(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VidQaError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VidQaError::InvalidVideoReference(_) => "invalid_video_reference",
            VidQaError::TranscriptUnavailable(_) => "transcript_unavailable",
            VidQaError::EmbeddingFailure(_) => "embedding_failure",
            VidQaError::EmptyIndex => "empty_index",
            VidQaError::GenerationFailure(_) => "generation_failure",
            VidQaError::Upstream(_) => "upstream",
            VidQaError::Config(_) => "config",
            VidQaError::InvalidInput(_) => "invalid_input",
            VidQaError::Io(_) => "io",
            VidQaError::Json(_) => "json",
            VidQaError::TomlParse(_) => "toml",
            VidQaError::Http(_) => "http",
        }
    }
}

/// Result type alias for vidqa operations.
pub type Result<T> = std::result::Result<T, VidQaError>;
