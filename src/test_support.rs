//! Fakes for the remote collaborators, shared by unit tests.

use crate::chunking::TextChunk;
use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{Result, VidQaError};
use crate::llm::{LanguageModel, Prompt};
use crate::orchestrator::Orchestrator;
use crate::session::{Session, VideoSession};
use crate::transcript::{Transcript, TranscriptFetcher, TranscriptSegment, VideoReference};
use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;

pub const CATS_VIDEO: &str = "catsvideo01";
pub const OTHER_VIDEO: &str = "riversvid01";

const RIVERS_TEXT: &[&str] = &[
    "Rivers carve valleys over thousands of years.",
    "Mountains rise where tectonic plates collide.",
    "Glaciers once covered much of the northern hemisphere.",
    "Deltas form where rivers slow down and drop their sediment.",
    "Volcanoes build islands in the middle of the ocean.",
    "Deserts receive very little rain during the year.",
    "Forests store carbon and shelter countless species.",
    "Wetlands filter water before it reaches the rivers.",
];

/// Canned transcript for the fake videos.
pub fn transcript(video_id: &str) -> Option<Transcript> {
    let lines: Vec<&str> = match video_id {
        CATS_VIDEO => vec!["Hello world this is a test video", "about cats."],
        OTHER_VIDEO => RIVERS_TEXT.to_vec(),
        _ => return None,
    };

    let segments = lines
        .iter()
        .enumerate()
        .map(|(i, line)| TranscriptSegment::new(i as f64 * 5.0, 5.0, line.to_string()))
        .collect();

    Some(
        Transcript::new(video_id.to_string(), "en", segments)
            .with_title(Some(format!("Video {}", video_id)))
            .with_language_name("English"),
    )
}

/// Serves canned transcripts; unknown IDs are treated as nonexistent videos.
pub struct FakeFetcher;

impl FakeFetcher {
    /// A video that exists but has captions disabled.
    pub const NO_CAPTIONS: &'static str = "nocaptions1";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TranscriptFetcher for FakeFetcher {
    async fn fetch(&self, video: &VideoReference, _languages: &[String]) -> Result<Transcript> {
        if video.video_id() == Self::NO_CAPTIONS {
            return Err(VidQaError::TranscriptUnavailable(
                "Transcripts are disabled for this video".to_string(),
            ));
        }
        transcript(video.video_id())
            .ok_or_else(|| VidQaError::InvalidVideoReference(format!("Video {} does not exist", video)))
    }
}

/// Deterministic bag-of-words embedder: each word increments one hashed bucket.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dimensions: 256 }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[(fnv1a(word) % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "hash-embedder"
    }
}

/// Embedder whose service is always down.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidQaError::EmbeddingFailure("service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VidQaError::EmbeddingFailure("service unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        256
    }

    fn model_id(&self) -> &str {
        "failing-embedder"
    }
}

/// Model that answers by restating the question.
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let question = prompt
            .user
            .lines()
            .find_map(|line| line.strip_prefix("Question: "))
            .unwrap_or("the question");
        Ok(format!("Based on the transcript: {}", question))
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

/// Model whose endpoint always errors.
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _prompt: &Prompt) -> Result<String> {
        Err(VidQaError::GenerationFailure("model overloaded".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

/// Model that returns only whitespace.
pub struct BlankModel;

#[async_trait]
impl LanguageModel for BlankModel {
    async fn generate(&self, _prompt: &Prompt) -> Result<String> {
        Ok("  \n".to_string())
    }

    fn model_id(&self) -> &str {
        "blank"
    }
}

/// Settings with chunks small enough that the longer fake video splits.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.chunking.chunk_size = 120;
    settings.chunking.chunk_overlap = 30;
    settings
}

pub fn orchestrator_with(
    fetcher: Arc<dyn TranscriptFetcher>,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn LanguageModel>,
) -> Orchestrator {
    Orchestrator::with_components(test_settings(), Prompts::default(), fetcher, embedder, model)
        .expect("valid test settings")
}

pub fn test_orchestrator() -> Orchestrator {
    orchestrator_with(
        Arc::new(FakeFetcher::new()),
        Arc::new(HashEmbedder::new()),
        Arc::new(EchoModel),
    )
}

/// A session whose video has exactly the given chunks, indexed with [`HashEmbedder`].
pub async fn session_with_chunks(texts: &[&str]) -> Session {
    let embedder = Arc::new(HashEmbedder::new());
    let segments = texts
        .iter()
        .enumerate()
        .map(|(i, text)| TranscriptSegment::new(i as f64 * 30.0, 30.0, text.to_string()))
        .collect();
    let transcript = Transcript::new("testvideo01".to_string(), "en", segments);

    let mut offset = 0;
    let mut chunks = Vec::new();
    let mut documents = Vec::new();
    for (order, text) in texts.iter().enumerate() {
        let chunk = TextChunk {
            order,
            content: text.to_string(),
            byte_offset: offset,
            start_seconds: order as f64 * 30.0,
        };
        offset += text.len() + 1;
        documents.push(Document::new(
            "testvideo01".to_string(),
            chunk.clone(),
            embedder.vector(text),
        ));
        chunks.push(chunk);
    }

    let mut index = MemoryVectorStore::new(embedder.dimensions());
    index.upsert_batch(documents).await.expect("valid test vectors");

    let video = VideoReference::parse("testvideo01").expect("valid test id");
    let mut session = Session::new();
    session.replace_video(VideoSession::new(video, &transcript, chunks, Box::new(index), embedder));
    session
}
