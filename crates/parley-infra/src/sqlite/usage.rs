//! SQLite usage repository implementation.
//!
//! Increments are a single upsert statement, so concurrent turns never lose
//! an update.

use chrono::{DateTime, Utc};
use parley_core::repository::usage::UsageRepository;
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::usage::UsageStat;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime};

/// SQLite-backed implementation of `UsageRepository`.
pub struct SqliteUsageRepository {
    pool: DatabasePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Upsert the counters on an open connection (plain or inside a transaction).
pub(super) async fn bump_usage(
    conn: &mut SqliteConnection,
    identity_id: &IdentityId,
    at: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO usage_stats (identity_id, messages_sent, messages_received, last_active_at)
         VALUES (?, 1, 1, ?)
         ON CONFLICT(identity_id) DO UPDATE SET
             messages_sent = messages_sent + 1,
             messages_received = messages_received + 1,
             last_active_at = excluded.last_active_at",
    )
    .bind(identity_id.to_string())
    .bind(format_datetime(&at))
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

impl UsageRepository for SqliteUsageRepository {
    async fn increment(&self, identity_id: &IdentityId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut conn = self.pool.writer.acquire().await.map_err(map_sqlx_error)?;
        bump_usage(&mut conn, identity_id, at).await
    }

    async fn get(&self, identity_id: &IdentityId) -> Result<Option<UsageStat>, RepositoryError> {
        let row = sqlx::query(
            "SELECT messages_sent, messages_received, last_active_at
             FROM usage_stats WHERE identity_id = ?",
        )
        .bind(identity_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sent: i64 = row
            .try_get("messages_sent")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let received: i64 = row
            .try_get("messages_received")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let last_active_at: Option<String> = row
            .try_get("last_active_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Some(UsageStat {
            identity_id: *identity_id,
            messages_sent: sent as u64,
            messages_received: received as u64,
            last_active_at: last_active_at.as_deref().map(parse_datetime).transpose()?,
        }))
    }
}
