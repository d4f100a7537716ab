//! Chat turn orchestration for Parley.
//!
//! `ChatService` ties the memory window, prompt assembler, generation
//! backend, and turn recorder together into one all-or-nothing chat turn.

pub mod service;
