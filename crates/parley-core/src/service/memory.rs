//! Memory window: the bounded, ordered slice of an identity's past turns.
//!
//! Recency is the only relevance heuristic; a window of size N is the N most
//! recent entries, returned oldest first.

use chrono::Utc;
use parley_types::error::MemoryError;
use parley_types::identity::IdentityId;
use parley_types::memory::{MemoryEntry, MemoryRole, NewMemoryEntry};
use tracing::info;

use crate::repository::memory::MemoryRepository;

/// Append-only per-identity conversation log with a most-recent-N read.
pub struct MemoryWindow<M: MemoryRepository> {
    memory_repo: M,
}

impl<M: MemoryRepository> MemoryWindow<M> {
    pub fn new(memory_repo: M) -> Self {
        Self { memory_repo }
    }

    /// Append one entry to the identity's log.
    pub async fn append(
        &self,
        identity_id: &IdentityId,
        role: MemoryRole,
        content: &str,
    ) -> Result<MemoryEntry, MemoryError> {
        let entry = NewMemoryEntry {
            role,
            content: content.to_string(),
        };
        Ok(self
            .memory_repo
            .append(identity_id, &entry, Utc::now())
            .await?)
    }

    /// At most `limit` most recent entries in chronological order.
    ///
    /// `limit` must be positive. Asking for more entries than exist returns
    /// all of them.
    pub async fn fetch(
        &self,
        identity_id: &IdentityId,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        if limit == 0 {
            return Err(MemoryError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        Ok(self.memory_repo.recent(identity_id, limit).await?)
    }

    /// Delete every entry of the identity. Irreversible.
    pub async fn clear(&self, identity_id: &IdentityId) -> Result<u64, MemoryError> {
        let removed = self.memory_repo.clear(identity_id).await?;
        info!(identity_id = %identity_id, removed, "Memory cleared");
        Ok(removed)
    }
}
