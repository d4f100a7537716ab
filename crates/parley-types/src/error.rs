use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to registration, login, and plan changes.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("identity not found")]
    NotFound,

    #[error("password hashing failed")]
    Hashing,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to session tokens.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid or expired session")]
    InvalidSession,

    #[error("session expiry is out of range")]
    ExpiryOutOfRange,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to the memory window.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to usage counters.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from a chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("text generation exceeded {after_secs}s deadline")]
    UpstreamTimeout { after_secs: u64 },

    #[error("text generation failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<MemoryError> for ChatError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::Validation(msg) => ChatError::Validation(msg),
            MemoryError::Storage(e) => ChatError::Storage(e),
        }
    }
}
