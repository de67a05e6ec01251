//! Pipeline orchestrator for vidqa.
//!
//! Coordinates the pipeline from transcript retrieval to answered questions.
//! The orchestrator holds only collaborators and configuration; all
//! per-user state lives in the [`Session`] passed to each operation.

use crate::chunking::{chunk_transcript, splitter_from_settings, RecursiveTextSplitter, TextChunk};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, validate_embeddings, Embedder};
use crate::error::{Result, VidQaError};
use crate::llm::{ChatCompletionModel, LanguageModel};
use crate::rag::{AnswerGenerator, ContextChunk, RagResponse, Retriever};
use crate::session::{Session, VideoInfo, VideoSession};
use crate::transcript::{Transcript, TranscriptFetcher, VideoReference, YoutubeTranscriptFetcher};
use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the vidqa pipeline.
pub struct Orchestrator {
    settings: Settings,
    fetcher: Arc<dyn TranscriptFetcher>,
    embedder: Arc<dyn Embedder>,
    splitter: RecursiveTextSplitter,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl Orchestrator {
    /// Create a new orchestrator with the configured remote services.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let timeout = settings.http_timeout();

        let fetcher = Arc::new(
            YoutubeTranscriptFetcher::new(timeout)?.with_translation(
                settings.transcript.translate_fallback,
                &settings.transcript.translation_target,
            ),
        );

        info!(
            "Using {} embeddings ({})",
            settings.embedding.provider, settings.embedding.model
        );
        let embedder = create_embedder(&settings.embedding, timeout)?;

        let model = Arc::new(ChatCompletionModel::from_settings(&settings.generation, timeout)?);

        Self::with_components(settings, prompts, fetcher, embedder, model)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        fetcher: Arc<dyn TranscriptFetcher>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        settings.validate()?;

        let splitter = splitter_from_settings(&settings.chunking)?;
        let retriever = Retriever::new(settings.retrieval.top_k);
        let generator = AnswerGenerator::new(model)
            .with_prompts(prompts)
            .with_response_language(settings.generation.response_language.clone())
            .with_max_history_turns(settings.generation.max_history_turns);

        Ok(Self {
            settings,
            fetcher,
            embedder,
            splitter,
            retriever,
            generator,
        })
    }

    /// Get a reference to the embedder new videos are indexed with.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch a video's transcript without indexing it.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn fetch_transcript(&self, input: &str, language: Option<&str>) -> Result<Transcript> {
        let video = VideoReference::parse(input)?;
        self.fetch(&video, language).await
    }

    async fn fetch(&self, video: &VideoReference, language: Option<&str>) -> Result<Transcript> {
        let languages = self.settings.transcript.preference_order(language)?;

        info!("Fetching transcript for {} ({})", video, languages.join(", "));
        let transcript = self.fetcher.fetch(video, &languages).await?;

        if transcript.is_empty() {
            return Err(VidQaError::TranscriptUnavailable(format!(
                "The transcript for {} is empty",
                video
            )));
        }
        if transcript.translated {
            warn!(
                "No transcript in a supported language; using a translation to {}",
                transcript.language_code
            );
        }

        Ok(transcript)
    }

    /// Process a video: fetch its transcript, chunk, embed, and index it.
    ///
    /// On success the session's video is replaced and its conversation
    /// cleared. On any failure the session is left exactly as it was.
    #[instrument(skip(self, session), fields(input = %input))]
    pub async fn process_video(
        &self,
        session: &mut Session,
        input: &str,
        language: Option<&str>,
    ) -> Result<VideoInfo> {
        let video = VideoReference::parse(input)?;
        let transcript = self.fetch(&video, language).await?;

        info!(
            "Transcript: {} characters in {}",
            transcript.char_count(),
            transcript.language
        );

        let video_session = self.index_transcript(video, &transcript).await?;
        let info = video_session.info().clone();

        if let Some(previous) = session.video() {
            info!("Replacing video {}", previous.info().video_id);
        }
        session.replace_video(video_session);

        Ok(info)
    }

    /// Chunk and embed a transcript into a new video session.
    async fn index_transcript(&self, video: VideoReference, transcript: &Transcript) -> Result<VideoSession> {
        let chunks = chunk_transcript(transcript, &self.splitter);
        if chunks.is_empty() {
            return Err(VidQaError::TranscriptUnavailable(format!(
                "The transcript for {} produced no text to index",
                video
            )));
        }
        info!("Created {} chunks", chunks.len());

        let index = self.embed_chunks(video.video_id(), &chunks).await?;
        info!("Indexed {} chunks", chunks.len());

        Ok(VideoSession::new(
            video,
            transcript,
            chunks,
            Box::new(index),
            self.embedder.clone(),
        ))
    }

    /// Generate embeddings and build a fresh index.
    async fn embed_chunks(&self, video_id: &str, chunks: &[TextChunk]) -> Result<MemoryVectorStore> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        validate_embeddings(&embeddings, chunks.len(), self.embedder.dimensions())?;

        let documents: Vec<Document> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| Document::new(video_id.to_string(), chunk, embedding))
            .collect();

        let mut index = MemoryVectorStore::new(self.embedder.dimensions());
        index.upsert_batch(documents).await?;

        Ok(index)
    }

    /// Retrieve the chunks most relevant to a question.
    #[instrument(skip(self, session))]
    pub async fn retrieve(
        &self,
        session: &Session,
        question: &str,
        k: Option<usize>,
    ) -> Result<Vec<ContextChunk>> {
        self.retriever.retrieve(session, question, k).await
    }

    /// Search the session's transcript, optionally dropping weak matches.
    pub async fn search(
        &self,
        session: &Session,
        query: &str,
        limit: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ContextChunk>> {
        let min_score = min_score.or_else(|| {
            let configured = self.settings.retrieval.min_score;
            (configured > 0.0).then_some(configured)
        });
        self.retriever.search(session, query, limit, min_score).await
    }

    /// Answer a question about the session's video and record the turn.
    #[instrument(skip(self, session), fields(question = %question))]
    pub async fn ask(&self, session: &mut Session, question: &str, k: Option<usize>) -> Result<RagResponse> {
        let context = self.retriever.retrieve(session, question, k).await?;
        let turn = self
            .generator
            .answer(question, context, session.history_mut())
            .await?;

        Ok(RagResponse {
            answer: turn.answer,
            sources: turn.sources,
        })
    }
}
