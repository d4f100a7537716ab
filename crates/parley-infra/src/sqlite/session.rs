//! SQLite session repository implementation.
//!
//! Rows are keyed by the token digest. Lookups join the owning identity so a
//! validated request needs one round trip.

use chrono::{DateTime, Utc};
use parley_core::repository::session::SessionRepository;
use parley_types::error::RepositoryError;
use parley_types::identity::{IdentityId, IdentitySummary};
use parley_types::session::Session;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime, parse_identity_id};

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct SessionIdentityRow {
    token_hash: String,
    identity_id: String,
    issued_at: String,
    expires_at: String,
    display_name: String,
    email: String,
    plan: String,
}

impl SessionIdentityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            token_hash: row.try_get("token_hash")?,
            identity_id: row.try_get("identity_id")?,
            issued_at: row.try_get("issued_at")?,
            expires_at: row.try_get("expires_at")?,
            display_name: row.try_get("display_name")?,
            email: row.try_get("email")?,
            plan: row.try_get("plan")?,
        })
    }

    fn into_pair(self) -> Result<(Session, IdentitySummary), RepositoryError> {
        let identity_id = parse_identity_id(&self.identity_id)?;
        let session = Session {
            token_hash: self.token_hash,
            identity_id,
            issued_at: parse_datetime(&self.issued_at)?,
            expires_at: parse_datetime(&self.expires_at)?,
        };
        let identity = IdentitySummary {
            id: identity_id,
            display_name: self.display_name,
            email: self.email,
            plan: self.plan.parse().map_err(RepositoryError::Query)?,
        };
        Ok((session, identity))
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, identity_id, issued_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_hash)
        .bind(session.identity_id.to_string())
        .bind(format_datetime(&session.issued_at))
        .bind(format_datetime(&session.expires_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_with_identity(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Session, IdentitySummary)>, RepositoryError> {
        let row = sqlx::query(
            "SELECT s.token_hash, s.identity_id, s.issued_at, s.expires_at,
                    i.display_name, i.email, i.plan
             FROM sessions s
             JOIN identities i ON i.id = s.identity_id
             WHERE s.token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| {
            SessionIdentityRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_pair()
        })
        .transpose()
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_identity(&self, identity_id: &IdentityId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE identity_id = ?")
            .bind(identity_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(format_datetime(&now))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
