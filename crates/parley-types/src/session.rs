//! Session token types.
//!
//! A session proves a successful prior login. Only a digest of the token is
//! persisted; the raw value exists on the wire and in the caller's hands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::identity::IdentityId;

/// Opaque bearer token handed to the caller after login.
///
/// Debug output redacts the value so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// The raw token value, for transport only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

/// A persisted session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Hex-encoded SHA-256 digest of the token; primary key.
    pub token_hash: String,
    pub identity_id: IdentityId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid iff `expires_at > now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Result of a successful `issue`: the raw token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub identity_id: IdentityId,
    pub expires_at: DateTime<Utc>,
}
