//! Cryptographic adapters for Parley.
//!
//! - `password`: argon2id password hashing with per-record salts
//! - `token`: random session tokens and their SHA-256 storage digests

pub mod password;
pub mod token;
