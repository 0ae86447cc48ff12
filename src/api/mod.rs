//! REST endpoints for the quote wizard and the admin chatbot.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::chatbot::ChatbotEngine;
use crate::error::Error;
use crate::wizard::form::AnswerValue;
use crate::wizard::manager::SessionManager;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub wizard: Arc<SessionManager>,
    pub chatbot: Arc<ChatbotEngine>,
}

/// Build the full application router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/wizard/sessions", post(create_session))
        .route("/api/wizard/sessions/{id}/step", get(get_step))
        .route("/api/wizard/sessions/{id}/answer", post(post_answer))
        .route("/api/wizard/sessions/{id}/back", post(post_back))
        .route("/api/ai/chatbot", post(post_chatbot))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Wrapper mapping engine errors onto HTTP responses.
///
/// Nothing here is fatal: unknown ids become 404s, rejected answers 422s,
/// and the body always carries a displayable message.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Session(_) => StatusCode::NOT_FOUND,
            Error::Graph(_) | Error::Navigation(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("API error: {}", self.0);
        }
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// POST /api/wizard/sessions
///
/// Creates a session and returns the first step.
async fn create_session(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let view = state.wizard.create_session().await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/wizard/sessions/{id}/step
async fn get_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.wizard.current_step(id).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    value: AnswerValue,
}

/// POST /api/wizard/sessions/{id}/answer
///
/// Validates and stores the answer for the current step, then advances.
/// The terminal response carries the computed quote.
async fn post_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerBody>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.wizard.answer(id, body.value).await?;
    Ok(Json(view))
}

/// POST /api/wizard/sessions/{id}/back
async fn post_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.wizard.back(id).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct ChatbotQuery {
    query: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

/// POST /api/ai/chatbot
///
/// Runs one tool-dispatch exchange. Always returns 200 with a displayable
/// message; LLM failures degrade to an apology inside the body. A request
/// without a `conversation_id` starts a fresh conversation; the minted id
/// is echoed in the reply so the client can continue it.
async fn post_chatbot(
    State(state): State<AppState>,
    Json(body): Json<ChatbotQuery>,
) -> impl IntoResponse {
    let conversation_id = body
        .conversation_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let reply = state.chatbot.handle_query(&conversation_id, &body.query).await;
    Json(reply)
}
