//! MemoryRepository trait definition.

use chrono::{DateTime, Utc};
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::memory::{MemoryEntry, NewMemoryEntry};

/// Repository trait for the per-identity conversational log.
pub trait MemoryRepository: Send + Sync {
    /// Append one entry. The returned entry carries the storage-assigned id.
    fn append(
        &self,
        identity_id: &IdentityId,
        entry: &NewMemoryEntry,
        created_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<MemoryEntry, RepositoryError>> + Send;

    /// The `limit` most recent entries, oldest first.
    fn recent(
        &self,
        identity_id: &IdentityId,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send;

    /// Delete all entries of an identity. Returns the count removed.
    fn clear(
        &self,
        identity_id: &IdentityId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
