//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod clock;
pub mod credential;
pub mod hash;
pub mod memory;
pub mod prompt;
pub mod session;
pub mod usage;
