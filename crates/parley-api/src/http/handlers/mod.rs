//! HTTP request handlers for the REST API.

pub mod auth;
pub mod chat;
pub mod usage;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::http::error::AppError;

/// Unwrap a JSON body, turning axum's rejection into a 400 envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}
