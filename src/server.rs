//! Backend glue: the HTTP handler that stitches together the embedding
//! provider, the document-vector store, and the completion provider.
//!
//! Endpoints:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/chat` | Answer a question with cited sources |
//! | `POST` | `/api/documents` | Embed and store one passage |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Failures return a non-2xx status with `{ "error": ..., "details": ... }`.
//! A missing credential is a 500 for that request, never a process crash.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{ChatRequest, ChatResponse, ErrorBody, Source};
use crate::config::Config;
use crate::embeddings;
use crate::llm::CompletionClient;
use crate::store::DocumentStore;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<DocumentStore>,
}

/// Start the glue server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let store = DocumentStore::open(&config.store.resolved_path(), config.store.dimensions)?;
    let bind = config.server.bind.clone();

    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/documents", post(handle_add_document))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    eprintln!("nutrichat server listening on http://{}", bind);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

struct AppError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        error: message.into(),
        details: None,
    }
}

fn config_error(details: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        error: "Configuration error".to_string(),
        details: Some(details.into()),
    }
}

fn provider_error(stage: &str, err: anyhow::Error) -> AppError {
    eprintln!("[server] {}: {}", stage, err);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        error: format!("{} failed", stage),
        details: Some(err.to_string()),
    }
}

/// Grounding context: each passage prefixed with its 1-based ordinal and
/// page number, in the same order the sources are returned to the client,
/// so the model's bracketed citations line up with the renderer's indexing.
fn build_context(sources: &[Source]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let page = source
                .metadata
                .page
                .map(|p| p.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("[{}] Page {}: {}", i + 1, page, source.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_prompt(question: &str, sources: &[Source]) -> String {
    format!(
        "You are a helpful nutrition expert assistant. Answer the following question based on the provided context from a nutrition textbook. Use the source citations [1], [2], etc. when referencing specific information.

Context:
{}

Question: {}

Instructions:
- Provide a comprehensive and accurate answer based on the context
- Use citation numbers [1], [2], etc. when referencing specific sources
- If the context doesn't contain enough information, say so
- Focus on being helpful and educational
- Keep the response conversational but informative

Answer:",
        build_context(sources),
        question
    )
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let config = &state.config;
    let embedding_key = config.embedding.api_key().ok_or_else(|| {
        config_error(format!(
            "missing embedding credential: {} is not set",
            config.embedding.api_key_env
        ))
    })?;
    let completion_key = config.completion.api_key().ok_or_else(|| {
        config_error(format!(
            "missing completion credential: {} is not set",
            config.completion.api_key_env
        ))
    })?;

    let query_embedding = embeddings::generate_embedding(
        &config.embedding.endpoint,
        &embedding_key,
        &config.embedding.model,
        message,
    )
    .await
    .map_err(|e| provider_error("Embedding", e))?;

    let sources = state
        .store
        .search(
            &query_embedding,
            config.server.document_filter.as_deref(),
            config.server.top_k,
        )
        .await
        .map_err(|e| provider_error("Vector search", e))?;

    let prompt = build_prompt(message, &sources);

    let client = CompletionClient::with_config(
        config.completion.endpoint.clone(),
        config.completion.model.clone(),
        completion_key,
        config.completion.max_tokens,
        config.completion.temperature,
    );
    let answer = client
        .complete(&prompt)
        .await
        .map_err(|e| provider_error("Completion", e))?;

    Ok(Json(ChatResponse { answer, sources }))
}

#[derive(Debug, Deserialize)]
struct AddDocumentRequest {
    content: String,
    page: Option<u32>,
    origin: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddDocumentResponse {
    id: i64,
}

async fn handle_add_document(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentRequest>,
) -> Result<Json<AddDocumentResponse>, AppError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(bad_request("content must not be empty"));
    }

    let config = &state.config;
    let embedding_key = config.embedding.api_key().ok_or_else(|| {
        config_error(format!(
            "missing embedding credential: {} is not set",
            config.embedding.api_key_env
        ))
    })?;

    let embedding = embeddings::generate_embedding(
        &config.embedding.endpoint,
        &embedding_key,
        &config.embedding.model,
        content,
    )
    .await
    .map_err(|e| provider_error("Embedding", e))?;

    let id = state
        .store
        .add_document(content, request.page, request.origin.as_deref(), &embedding)
        .await
        .map_err(|e| provider_error("Store insert", e))?;

    Ok(Json(AddDocumentResponse { id }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
