//! vidqa - Ask questions about YouTube videos
//!
//! A retrieval-augmented question-answering assistant for YouTube videos.
//!
//! # Overview
//!
//! vidqa lets you:
//! - Fetch a video's caption transcript in a supported language
//! - Split and embed the transcript into an in-memory index for that video
//! - Ask free-text questions and get answers grounded in the transcript
//! - Keep and export the conversation
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `transcript` - Video references and transcript retrieval
//! - `chunking` - Transcript chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `llm` - Language model access
//! - `rag` - Retrieval and answer generation
//! - `session` - Caller-owned session state and export
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidqa::config::Settings;
//! use vidqa::orchestrator::Orchestrator;
//! use vidqa::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let mut session = Session::new();
//!
//!     let info = orchestrator
//!         .process_video(&mut session, "https://youtu.be/dQw4w9WgXcQ", None)
//!         .await?;
//!     println!("Indexed {} chunks", info.chunk_count);
//!
//!     let response = orchestrator
//!         .ask(&mut session, "What is the video about?", None)
//!         .await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, VidQaError};
