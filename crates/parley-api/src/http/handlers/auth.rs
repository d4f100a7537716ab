//! Registration, login, and session handlers.
//!
//! Endpoints:
//! - POST /register    - Create an identity on the basic plan
//! - POST /login       - Verify credentials and issue a session
//! - POST /logout      - Revoke the presented session
//! - POST /logout-all  - Revoke every session of the caller
//! - GET  /me          - Current identity summary
//! - POST /upgrade     - Move the caller to the premium plan

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use parley_types::identity::{IdentitySummary, LoginRequest, RegisterRequest};
use serde_json::json;

use crate::http::cookie::{clear_cookie, session_cookie};
use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentIdentity;
use crate::http::handlers::json_body;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /register - Create an identity.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let body = json_body(payload)?;

    let identity_id = state.credentials.register(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::timed(json!({ "identity_id": identity_id }), start)),
    ))
}

/// POST /login - Verify credentials, issue a session, and set the cookie.
///
/// The token is returned in the body as well for non-browser clients.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let body = json_body(payload)?;

    let identity = state.credentials.verify(&body.email, &body.password).await?;
    let issued = state.sessions.issue(&identity.id).await?;

    let auth = &state.config.auth;
    let cookie = session_cookie(
        &auth.cookie_name,
        issued.token.expose(),
        state.sessions.ttl().num_seconds(),
        auth.cookie_secure,
    );

    let data = json!({
        "identity": identity.summary(),
        "token": issued.token.expose(),
        "expires_at": issued.expires_at.to_rfc3339(),
    });

    Ok(([(SET_COOKIE, cookie)], Json(ApiResponse::timed(data, start))))
}

/// POST /logout - Revoke the session used for this request.
pub async fn logout(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    state.sessions.revoke(&caller.token).await?;

    let auth = &state.config.auth;
    let cookie = clear_cookie(&auth.cookie_name, auth.cookie_secure);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::timed(json!({ "logged_out": true }), start)),
    ))
}

/// POST /logout-all - Revoke every session of the caller.
pub async fn logout_all(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let revoked = state.sessions.revoke_all(&caller.identity.id).await?;

    let auth = &state.config.auth;
    let cookie = clear_cookie(&auth.cookie_name, auth.cookie_secure);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::timed(json!({ "revoked": revoked }), start)),
    ))
}

/// GET /me - Current identity summary.
pub async fn me(caller: CurrentIdentity) -> Json<ApiResponse<IdentitySummary>> {
    let start = Instant::now();
    Json(ApiResponse::timed(caller.identity, start))
}

/// POST /upgrade - Move the caller to the premium plan. Idempotent.
pub async fn upgrade(
    State(state): State<AppState>,
    caller: CurrentIdentity,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let plan = state.credentials.upgrade(&caller.identity.id).await?;
    Ok(Json(ApiResponse::timed(json!({ "plan": plan }), start)))
}
