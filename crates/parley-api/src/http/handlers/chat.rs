//! Chat and memory handlers.
//!
//! Endpoints:
//! - POST /chat          - Run one chat turn (auth optional unless configured)
//! - POST /clear-memory  - Delete the caller's memory log
//! - GET  /memory        - The caller's current memory window

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use parley_types::memory::MemoryEntry;
use serde::Deserialize;
use serde_json::json;

use crate::http::error::AppError;
use crate::http::extractors::auth::{CurrentIdentity, OptionalIdentity};
use crate::http::handlers::json_body;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Query parameters for `GET /memory`.
#[derive(Debug, Deserialize)]
pub struct MemoryQuery {
    /// Defaults to the configured window size.
    pub limit: Option<usize>,
}

/// POST /chat - Run one chat turn.
pub async fn chat(
    State(state): State<AppState>,
    OptionalIdentity(caller): OptionalIdentity,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let body = json_body(payload)?;

    let reply = state.chat.chat(caller.as_ref(), &body.message).await?;

    Ok(Json(ApiResponse::timed(
        json!({
            "reply": reply.text,
            "plan": reply.plan,
            "remembered": reply.remembered,
        }),
        start,
    )))
}

/// POST /clear-memory - Delete every memory entry of the caller.
pub async fn clear_memory(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let cleared = state.chat.window().clear(&caller.identity.id).await?;
    Ok(Json(ApiResponse::timed(json!({ "cleared": cleared }), start)))
}

/// GET /memory - The caller's most recent entries, oldest first.
pub async fn get_memory(
    State(state): State<AppState>,
    caller: CurrentIdentity,
    Query(query): Query<MemoryQuery>,
) -> Result<Json<ApiResponse<Vec<MemoryEntry>>>, AppError> {
    let start = Instant::now();
    let limit = query.limit.unwrap_or(state.chat.settings().window_size);
    let entries = state.chat.window().fetch(&caller.identity.id, limit).await?;
    Ok(Json(ApiResponse::timed(entries, start)))
}
