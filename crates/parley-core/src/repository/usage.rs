//! UsageRepository trait definition.

use chrono::{DateTime, Utc};
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::usage::UsageStat;

/// Repository trait for per-identity usage counters.
pub trait UsageRepository: Send + Sync {
    /// Upsert the row, adding one to both counters and stamping `last_active_at`.
    ///
    /// Must be a single atomic statement; callers never read-modify-write.
    fn increment(
        &self,
        identity_id: &IdentityId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the counters of an identity, if it has chatted.
    fn get(
        &self,
        identity_id: &IdentityId,
    ) -> impl std::future::Future<Output = Result<Option<UsageStat>, RepositoryError>> + Send;
}
