use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use budget_qa_core::{Answer, CompletionClient, Embedder, EngineError, QaEngine, VectorIndex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub struct AppState<E, V, C>
where
    E: Embedder,
    V: VectorIndex,
    C: CompletionClient,
{
    pub engine: Arc<QaEngine<E, V, C>>,
    pub index_page: PathBuf,
}

impl<E, V, C> Clone for AppState<E, V, C>
where
    E: Embedder,
    V: VectorIndex,
    C: CompletionClient,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            index_page: self.index_page.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Request-boundary error: every failure becomes a JSON payload and a status
/// code here, and the process keeps serving.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Question is required")]
    MissingQuestion,

    #[error("{0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::EmptyQuestion => Self::MissingQuestion,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingQuestion => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router<E, V, C>(state: AppState<E, V, C>) -> Router
where
    E: Embedder + Send + Sync + 'static,
    V: VectorIndex + Send + Sync + 'static,
    C: CompletionClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(serve_index::<E, V, C>))
        .route("/chat", post(chat::<E, V, C>))
        .with_state(state)
}

/// The static landing page. Served uncached so edits show up on reload.
async fn serve_index<E, V, C>(State(state): State<AppState<E, V, C>>) -> Result<Response, ApiError>
where
    E: Embedder + Send + Sync + 'static,
    V: VectorIndex + Send + Sync + 'static,
    C: CompletionClient + Send + Sync + 'static,
{
    let page = tokio::fs::read_to_string(&state.index_page)
        .await
        .map_err(|error| {
            ApiError::Internal(format!(
                "failed to read landing page {}: {error}",
                state.index_page.display()
            ))
        })?;

    Ok(([(header::CACHE_CONTROL, "no-cache")], Html(page)).into_response())
}

async fn chat<E, V, C>(
    State(state): State<AppState<E, V, C>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Answer>, ApiError>
where
    E: Embedder + Send + Sync + 'static,
    V: VectorIndex + Send + Sync + 'static,
    C: CompletionClient + Send + Sync + 'static,
{
    let question = request.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(ApiError::MissingQuestion);
    }

    let answer = state.engine.answer(&question).await?;
    Ok(Json(answer))
}
