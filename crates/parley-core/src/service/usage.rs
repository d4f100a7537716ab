//! Usage counter: per-identity aggregate chat activity.

use chrono::Utc;
use parley_types::error::UsageError;
use parley_types::identity::IdentityId;
use parley_types::usage::UsageStat;

use crate::repository::usage::UsageRepository;

/// Maintains sent/received counters and the last-active timestamp.
pub struct UsageCounter<U: UsageRepository> {
    usage_repo: U,
}

impl<U: UsageRepository> UsageCounter<U> {
    pub fn new(usage_repo: U) -> Self {
        Self { usage_repo }
    }

    /// Count one completed turn: +1 sent, +1 received, `last_active_at = now`.
    ///
    /// The increment happens inside the repository, so concurrent calls for
    /// the same identity never lose updates.
    pub async fn increment(&self, identity_id: &IdentityId) -> Result<(), UsageError> {
        Ok(self.usage_repo.increment(identity_id, Utc::now()).await?)
    }

    /// Current counters, zeros if the identity has never chatted.
    pub async fn get(&self, identity_id: &IdentityId) -> Result<UsageStat, UsageError> {
        Ok(self
            .usage_repo
            .get(identity_id)
            .await?
            .unwrap_or_else(|| UsageStat::empty(*identity_id)))
    }
}
