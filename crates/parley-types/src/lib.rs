//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley service:
//! Identity, Session, MemoryEntry, UsageStat, text-generation requests, the
//! configuration model, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod memory;
pub mod session;
pub mod usage;
