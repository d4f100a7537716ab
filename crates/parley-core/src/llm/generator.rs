//! TextGenerator trait definition.
//!
//! The generation service is an external collaborator. Implementations
//! normalize whatever the provider returns into a single
//! [`GenerationOutput`] or a typed [`LlmError`], so callers never branch on
//! response shape.

use parley_types::llm::{GenerationOutput, GenerationRequest, LlmError};

/// Trait for text-generation backends.
///
/// Implementations live in parley-infra (e.g., `CompletionsGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name, for logs.
    fn name(&self) -> &str;

    /// Generate text for an assembled request.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationOutput, LlmError>> + Send;
}
