//! HTTP API server.
//!
//! Serves one shared session: process a video, then ask questions about it.
//! Requests are serialized on the session lock.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::VidQaError;
use crate::orchestrator::Orchestrator;
use crate::rag::ContextChunk;
use crate::session::{export_history, ConversationTurn, ExportFormat, Session, VideoInfo};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            session: Mutex::new(Session::new()),
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/video", post(process_video).get(current_video))
        .route("/ask", post(ask))
        .route("/search", post(search))
        .route("/history", get(history))
        .route("/export", get(export))
        .route("/session", delete(reset_session))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let app = router(Arc::new(AppState::new(orchestrator)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("vidqa API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Process video", "POST   /video");
    Output::kv("Current video", "GET    /video");
    Output::kv("Ask", "POST   /ask");
    Output::kv("Search", "POST   /search");
    Output::kv("History", "GET    /history");
    Output::kv("Export", "GET    /export?format=json|text");
    Output::kv("Reset", "DELETE /session");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct VideoRequest {
    /// YouTube URL or video ID
    input: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<ContextChunk>,
    /// Number of turns in the conversation, this one included.
    turns: usize,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    min_score: Option<f32>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ContextChunk>,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    video_id: Option<String>,
    turns: Vec<ConversationTurn>,
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default)]
    format: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

/// Error wrapper mapping pipeline errors to HTTP statuses.
struct ApiError(VidQaError);

impl From<VidQaError> for ApiError {
    fn from(e: VidQaError) -> Self {
        Self(e)
    }
}

fn status_for(error: &VidQaError) -> StatusCode {
    match error {
        VidQaError::InvalidVideoReference(_) | VidQaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        VidQaError::TranscriptUnavailable(_) => StatusCode::NOT_FOUND,
        VidQaError::EmptyIndex => StatusCode::CONFLICT,
        VidQaError::EmbeddingFailure(_)
        | VidQaError::GenerationFailure(_)
        | VidQaError::Upstream(_)
        | VidQaError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            status_for(&self.0),
            Json(ErrorResponse {
                error: self.0.to_string(),
                kind: self.0.kind(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoRequest>,
) -> ApiResult<VideoInfo> {
    let mut session = state.session.lock().await;
    let info = state
        .orchestrator
        .process_video(&mut session, &req.input, req.language.as_deref())
        .await?;
    Ok(Json(info))
}

async fn current_video(State(state): State<Arc<AppState>>) -> ApiResult<VideoInfo> {
    let session = state.session.lock().await;
    let video = session.video().ok_or(VidQaError::EmptyIndex)?;
    Ok(Json(video.info().clone()))
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> ApiResult<AskResponse> {
    let mut session = state.session.lock().await;
    let response = state
        .orchestrator
        .ask(&mut session, &req.question, req.k)
        .await?;
    Ok(Json(AskResponse {
        answer: response.answer,
        sources: response.sources,
        turns: session.history().len(),
    }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    let session = state.session.lock().await;
    let results = state
        .orchestrator
        .search(&session, &req.query, req.limit, req.min_score)
        .await?;
    Ok(Json(SearchResponse { results }))
}

async fn history(State(state): State<Arc<AppState>>) -> ApiResult<HistoryResponse> {
    let session = state.session.lock().await;
    Ok(Json(HistoryResponse {
        session_id: session.id(),
        started_at: session.created_at(),
        video_id: session.video().map(|v| v.info().video_id.clone()),
        turns: session.history().turns().to_vec(),
    }))
}

async fn export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> std::result::Result<Response, ApiError> {
    let format: ExportFormat = match query.format.as_deref() {
        Some(format) => format.parse()?,
        None => ExportFormat::default(),
    };

    let session = state.session.lock().await;
    let content_type = match format {
        ExportFormat::Json => "application/json",
        ExportFormat::Text => "text/plain; charset=utf-8",
    };

    Ok(match export_history(&session, format)? {
        Some(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn reset_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.lock().await.reset();
    Json(serde_json::json!({ "status": "reset" }))
}
