//! Prompt assembler: renders preamble, memory window, and the new message
//! into one prompt plus plan-dependent generation parameters.
//!
//! Layout:
//! ```text
//! {preamble}
//!
//! {role}: {content}        <- one line per memory entry, oldest first
//! ...
//! user: {message}
//! {response_cue}
//! ```
//! The memory block (and the blank line after it) is omitted when the window
//! is empty. Output is a pure function of the inputs.

use parley_types::config::PlanTable;
use parley_types::identity::Plan;
use parley_types::llm::GenerationRequest;
use parley_types::memory::{MemoryEntry, MemoryRole};

/// Deterministic prompt builder with a per-plan parameter table.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    preamble: String,
    response_cue: String,
    plans: PlanTable,
}

impl PromptAssembler {
    pub fn new(preamble: impl Into<String>, response_cue: impl Into<String>, plans: PlanTable) -> Self {
        Self {
            preamble: preamble.into(),
            response_cue: response_cue.into(),
            plans,
        }
    }

    /// Build the request for `plan`. Anonymous callers pass `Plan::Basic` and
    /// an empty memory slice.
    pub fn build(&self, plan: Plan, memory: &[MemoryEntry], message: &str) -> GenerationRequest {
        let mut prompt = String::with_capacity(
            self.preamble.len()
                + memory.iter().map(|e| e.content.len() + 12).sum::<usize>()
                + message.len()
                + 32,
        );

        prompt.push_str(self.preamble.trim_end());
        prompt.push_str("\n\n");

        if !memory.is_empty() {
            let rendered: Vec<String> = memory
                .iter()
                .map(|entry| format!("{}: {}", entry.role, entry.content))
                .collect();
            prompt.push_str(&rendered.join("\n"));
            prompt.push_str("\n\n");
        }

        prompt.push_str(&format!("{}: {}\n", MemoryRole::User, message));
        prompt.push_str(&self.response_cue);

        let params = self.plans.params_for(plan);
        GenerationRequest {
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}
