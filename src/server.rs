//! HTTP surface for the document intelligence service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::assistant::{DocumentAnalysis, DocumentAssistant};
use crate::document::DocumentId;
use crate::error::DocIntelError;
use crate::pipeline::RetrievalPipeline;
use crate::store::DocumentStore;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion and retrieval.
    pub pipeline: Arc<RetrievalPipeline>,
    /// Analysis and chat on top of the pipeline.
    pub assistant: Arc<DocumentAssistant>,
    /// The registry behind the pipeline, for health reporting.
    pub store: Arc<DocumentStore>,
}

/// Bind address for [`run_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub document_id: DocumentId,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub document_id: String,
    pub question: String,
    /// Overrides the configured number of passages when present.
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub context: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub document_id: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ErrorReply = (StatusCode, Json<ErrorBody>);

/// Map a failure to its HTTP status. Invalid input is the caller's fault
/// (400), unknown documents are 404, and everything else is an internal
/// error whose detail goes to the log rather than the response body.
fn error_reply(err: DocIntelError) -> ErrorReply {
    let status = match &err {
        DocIntelError::EmptyInput => StatusCode::BAD_REQUEST,
        DocIntelError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
        "An internal server error occurred.".to_string()
    } else {
        err.to_string()
    };

    (status, Json(ErrorBody { error: message }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let documents = state.store.len().await;
    Json(json!({
        "status": "ok",
        "service": "docintel",
        "documents": documents,
    }))
}

async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ErrorReply> {
    let document_id = state
        .pipeline
        .ingest(&request.text)
        .await
        .map_err(error_reply)?;
    Ok(Json(IngestResponse { document_id }))
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ErrorReply> {
    // Same bound the config builder enforces for the configured top_k.
    if request.top_k == Some(0) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "top_k must be greater than zero".to_string(),
            }),
        ));
    }
    let context = match request.top_k {
        Some(top_k) => {
            state
                .pipeline
                .retrieve_context_top_k(&request.document_id, &request.question, top_k)
                .await
        }
        None => {
            state
                .pipeline
                .retrieve_context(&request.document_id, &request.question)
                .await
        }
    }
    .map_err(error_reply)?;
    Ok(Json(QueryResponse { context }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<DocumentAnalysis>, ErrorReply> {
    let analysis = state
        .assistant
        .analyze(&request.text)
        .await
        .map_err(error_reply)?;
    Ok(Json(analysis))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorReply> {
    let answer = state
        .assistant
        .chat(&request.document_id, &request.question)
        .await
        .map_err(error_reply)?;
    Ok(Json(ChatResponse { answer }))
}

/// Build the application router with CORS and request tracing.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/query", post(query))
        .route("/analyze", post(analyze))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("docintel server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
