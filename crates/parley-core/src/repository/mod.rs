//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (parley-infra) implements. Each component receives its repository by
//! injection, so every contract can be exercised against an in-memory fake.

pub mod identity;
pub mod memory;
pub mod session;
pub mod turn;
pub mod usage;
