//! Text generation backends.
//!
//! - `completions`: OpenAI-compatible `/completions` endpoint over HTTP

pub mod completions;
