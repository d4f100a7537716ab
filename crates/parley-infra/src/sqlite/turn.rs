//! SQLite turn recorder.
//!
//! Writes the user entry, the assistant entry, and the usage upsert inside
//! one transaction on the writer connection.

use chrono::{DateTime, Utc};
use parley_core::repository::turn::TurnRecorder;
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::memory::{MemoryEntry, NewMemoryEntry};
use tracing::debug;

use super::memory::insert_entry;
use super::pool::DatabasePool;
use super::usage::bump_usage;
use super::map_sqlx_error;

/// SQLite-backed implementation of `TurnRecorder`.
pub struct SqliteTurnRecorder {
    pool: DatabasePool,
}

impl SqliteTurnRecorder {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl TurnRecorder for SqliteTurnRecorder {
    async fn record_turn(
        &self,
        identity_id: &IdentityId,
        user: &NewMemoryEntry,
        assistant: &NewMemoryEntry,
        at: DateTime<Utc>,
    ) -> Result<(MemoryEntry, MemoryEntry), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;

        // Dropping `tx` on an early return rolls everything back.
        let user_entry = insert_entry(&mut tx, identity_id, user, at).await?;
        let assistant_entry = insert_entry(&mut tx, identity_id, assistant, at).await?;
        bump_usage(&mut tx, identity_id, at).await?;

        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(
            identity_id = %identity_id,
            user_entry = user_entry.id,
            assistant_entry = assistant_entry.id,
            "Turn committed"
        );
        Ok((user_entry, assistant_entry))
    }
}
