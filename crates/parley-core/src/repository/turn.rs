//! TurnRecorder trait definition.
//!
//! A completed chat turn touches two stores: the memory log and the usage
//! counters. The recorder commits both in one unit so a failure leaves no
//! half-recorded turn behind.

use chrono::{DateTime, Utc};
use parley_types::error::RepositoryError;
use parley_types::identity::IdentityId;
use parley_types::memory::{MemoryEntry, NewMemoryEntry};

/// Atomic commit of one chat turn.
pub trait TurnRecorder: Send + Sync {
    /// Append `user` then `assistant` as a contiguous pair and increment the
    /// usage counters, all or nothing.
    fn record_turn(
        &self,
        identity_id: &IdentityId,
        user: &NewMemoryEntry,
        assistant: &NewMemoryEntry,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(MemoryEntry, MemoryEntry), RepositoryError>> + Send;
}
