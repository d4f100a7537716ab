//! Per-identity usage counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityId;

/// Aggregate chat activity for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStat {
    pub identity_id: IdentityId,
    pub messages_sent: u64,
    pub messages_received: u64,
    /// `None` until the first completed chat turn.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl UsageStat {
    /// Zero counters for an identity that has not chatted yet.
    pub fn empty(identity_id: IdentityId) -> Self {
        Self {
            identity_id,
            messages_sent: 0,
            messages_received: 0,
            last_active_at: None,
        }
    }
}
