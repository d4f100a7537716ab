//! Text-generation request/response types.
//!
//! The external generation service is a black box: it accepts a prompt plus
//! generation parameters and returns text or fails. Every provider response
//! is normalized into [`GenerationOutput`] at the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plan-dependent sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A fully assembled request for the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Normalized generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub text: String,
}

/// Errors from the text-generation boundary.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("generation timed out")]
    Timeout,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,
}
