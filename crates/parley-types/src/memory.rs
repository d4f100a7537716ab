//! Conversational memory types.
//!
//! Memory entries form an append-only, per-identity log of chat turns. The
//! numeric id is assigned by storage and increases with creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::identity::IdentityId;

/// Author of a memory entry.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
}

impl fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryRole::User => write!(f, "user"),
            MemoryRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MemoryRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MemoryRole::User),
            "assistant" => Ok(MemoryRole::Assistant),
            other => Err(format!("invalid memory role: '{other}'")),
        }
    }
}

/// A stored conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Monotonically increasing per identity (storage-assigned).
    pub id: i64,
    pub identity_id: IdentityId,
    pub role: MemoryRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A turn waiting to be appended.
#[derive(Debug, Clone)]
pub struct NewMemoryEntry {
    pub role: MemoryRole,
    pub content: String,
}

impl NewMemoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MemoryRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MemoryRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_role_roundtrip() {
        for role in [MemoryRole::User, MemoryRole::Assistant] {
            let parsed: MemoryRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_memory_role_serde() {
        let json = serde_json::to_string(&MemoryRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_memory_role_rejects_system() {
        assert!("system".parse::<MemoryRole>().is_err());
    }

    #[test]
    fn test_new_entry_constructors() {
        assert_eq!(NewMemoryEntry::user("hi").role, MemoryRole::User);
        assert_eq!(NewMemoryEntry::assistant("hello").role, MemoryRole::Assistant);
    }
}
