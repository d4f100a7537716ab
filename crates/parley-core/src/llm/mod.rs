//! Text-generation abstraction for Parley.
//!
//! - `TextGenerator`: RPITIT trait for the external generation service

pub mod generator;
