//! Identity and plan types.
//!
//! An identity is a registered account. It owns a plan tier that controls
//! generation budget and determinism, and a one-way password hash that never
//! leaves the credential layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an identity, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// Create a new IdentityId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create an IdentityId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Subscription tier of an identity.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (plan IN ('basic', 'premium'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Premium,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Basic => write!(f, "basic"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "premium" => Ok(Plan::Premium),
            other => Err(format!("invalid plan: '{other}'")),
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Basic
    }
}

/// A registered account.
///
/// `password_hash` is a PHC-format string produced by the password hasher.
/// Debug output redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub display_name: String,
    /// Normalized (trimmed, lowercase) email; unique across identities.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// The public view of this identity, without the password hash.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            plan: self.plan,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("plan", &self.plan)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Identity as seen by an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub id: IdentityId,
    pub display_name: String,
    pub email: String,
    pub plan: Plan,
}

/// Request body for registering a new identity.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for logging in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
