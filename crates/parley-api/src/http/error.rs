//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Storage and upstream failures are logged with their detail and answered
//! with a generic message; only caller-actionable errors echo their text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::{
    ChatError, CredentialError, MemoryError, RepositoryError, SessionError, UsageError,
};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Credential(CredentialError),
    Session(SessionError),
    Memory(MemoryError),
    Usage(UsageError),
    Chat(ChatError),
    /// Missing or unusable session token.
    Unauthorized(String),
    /// Validation error raised at the HTTP edge.
    Validation(String),
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        AppError::Credential(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Memory(e)
    }
}

impl From<UsageError> for AppError {
    fn from(e: UsageError) -> Self {
        AppError::Usage(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

fn storage_failure(e: &RepositoryError) -> (StatusCode, &'static str, String) {
    match e {
        RepositoryError::PoolExhausted => (
            StatusCode::SERVICE_UNAVAILABLE,
            "STORAGE_BUSY",
            "Storage is busy, try again shortly".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_ERROR",
            "Storage unavailable".to_string(),
        ),
    }
}

impl AppError {
    /// Status, machine-readable code, and the message shown to the caller.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Credential(CredentialError::Validation(msg))
            | AppError::Memory(MemoryError::Validation(msg))
            | AppError::Chat(ChatError::Validation(msg))
            | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Credential(CredentialError::EmailTaken(email)) => (
                StatusCode::CONFLICT,
                "EMAIL_TAKEN",
                format!("Email '{email}' is already registered"),
            ),
            AppError::Credential(CredentialError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Credential(CredentialError::NotFound) => (
                StatusCode::NOT_FOUND,
                "IDENTITY_NOT_FOUND",
                "Identity not found".to_string(),
            ),
            AppError::Credential(CredentialError::Hashing)
            | AppError::Session(SessionError::ExpiryOutOfRange) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error".to_string(),
            ),
            AppError::Session(SessionError::InvalidSession) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_SESSION",
                "Session is invalid or expired".to_string(),
            ),
            AppError::Chat(ChatError::Unauthenticated) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Chat(ChatError::UpstreamTimeout { after_secs }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                format!("Text generation did not finish within {after_secs}s"),
            ),
            AppError::Chat(ChatError::Upstream(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                "Text generation failed".to_string(),
            ),
            AppError::Credential(CredentialError::Storage(e))
            | AppError::Session(SessionError::Storage(e))
            | AppError::Memory(MemoryError::Storage(e))
            | AppError::Usage(UsageError::Storage(e))
            | AppError::Chat(ChatError::Storage(e)) => storage_failure(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = ?self, "Request failed");
        } else {
            tracing::debug!(code, "Request rejected");
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
