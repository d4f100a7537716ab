//! SQLite memory repository implementation.
//!
//! The log is append-only per identity. Entry ids come from an autoincrement
//! column, so `ORDER BY id` is the canonical order even when two entries
//! share a timestamp.

use chrono::{DateTime, Utc};
use parley_core::repository::memory::MemoryRepository;
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::memory::{MemoryEntry, NewMemoryEntry};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime, parse_identity_id};

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MemoryEntryRow {
    id: i64,
    identity_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MemoryEntryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            identity_id: row.try_get("identity_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<MemoryEntry, RepositoryError> {
        Ok(MemoryEntry {
            id: self.id,
            identity_id: parse_identity_id(&self.identity_id)?,
            role: self.role.parse().map_err(RepositoryError::Query)?,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Insert one entry on an open connection (plain or inside a transaction).
pub(super) async fn insert_entry(
    conn: &mut SqliteConnection,
    identity_id: &IdentityId,
    entry: &NewMemoryEntry,
    created_at: DateTime<Utc>,
) -> Result<MemoryEntry, RepositoryError> {
    let result = sqlx::query(
        "INSERT INTO memory_entries (identity_id, role, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(identity_id.to_string())
    .bind(entry.role.to_string())
    .bind(&entry.content)
    .bind(format_datetime(&created_at))
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(MemoryEntry {
        id: result.last_insert_rowid(),
        identity_id: *identity_id,
        role: entry.role,
        content: entry.content.clone(),
        created_at,
    })
}

impl MemoryRepository for SqliteMemoryRepository {
    async fn append(
        &self,
        identity_id: &IdentityId,
        entry: &NewMemoryEntry,
        created_at: DateTime<Utc>,
    ) -> Result<MemoryEntry, RepositoryError> {
        let mut conn = self.pool.writer.acquire().await.map_err(map_sqlx_error)?;
        insert_entry(&mut conn, identity_id, entry, created_at).await
    }

    async fn recent(
        &self,
        identity_id: &IdentityId,
        limit: u32,
    ) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, identity_id, role, content, created_at
             FROM memory_entries
             WHERE identity_id = ?
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(identity_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut entries = rows
            .iter()
            .map(|r| {
                MemoryEntryRow::from_row(r)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_entry()
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }

    async fn clear(&self, identity_id: &IdentityId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM memory_entries WHERE identity_id = ?")
            .bind(identity_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
