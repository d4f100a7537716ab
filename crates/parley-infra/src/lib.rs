//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`:
//! SQLite storage, argon2 password hashing, random session tokens, and an
//! HTTP client for OpenAI-compatible completion endpoints.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
