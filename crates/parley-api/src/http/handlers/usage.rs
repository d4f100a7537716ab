//! Usage statistics handler.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use parley_types::usage::UsageStat;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentIdentity;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /usage - The caller's counters (zeros before the first chat).
pub async fn get_usage(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> Result<Json<ApiResponse<UsageStat>>, AppError> {
    let start = Instant::now();
    let stat = state.usage.get(&caller.identity.id).await?;
    Ok(Json(ApiResponse::timed(stat, start)))
}
