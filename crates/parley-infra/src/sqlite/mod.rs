//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod identity;
pub mod memory;
pub mod pool;
pub mod session;
pub mod turn;
pub mod usage;

use chrono::{DateTime, SecondsFormat, Utc};
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps so stored values sort in time order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_identity_id(s: &str) -> Result<IdentityId, RepositoryError> {
    s.parse()
        .map_err(|e| RepositoryError::Query(format!("invalid identity id: {e}")))
}

/// Map a sqlx error onto the repository taxonomy.
///
/// Pool timeouts become `PoolExhausted` so callers can answer "busy" instead
/// of a generic failure; unique violations become `Conflict`.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut => RepositoryError::PoolExhausted,
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) => RepositoryError::Connection,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}
