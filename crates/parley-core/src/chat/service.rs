//! Chat service orchestrating one conversational turn.
//!
//! Flow for an authenticated caller:
//! 1. take the identity's turn lock (when `serialize_turns` is on)
//! 2. fetch the memory window
//! 3. assemble the prompt for the caller's plan
//! 4. call the generator under a deadline
//! 5. record user turn, assistant turn, and usage in one commit
//!
//! If step 4 fails or times out nothing is recorded. Anonymous callers (when
//! allowed) get an empty window, basic-tier parameters, and no persistence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parley_types::error::ChatError;
use parley_types::identity::{IdentityId, IdentitySummary, Plan};
use parley_types::llm::{GenerationRequest, LlmError};
use parley_types::memory::NewMemoryEntry;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::llm::generator::TextGenerator;
use crate::repository::memory::MemoryRepository;
use crate::repository::turn::TurnRecorder;
use crate::service::memory::MemoryWindow;
use crate::service::prompt::PromptAssembler;

/// Tunables for a chat turn.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Memory entries fed into each prompt.
    pub window_size: usize,
    /// Deadline for the generation call.
    pub upstream_timeout: Duration,
    /// Reject anonymous callers instead of serving them without memory.
    pub require_auth: bool,
    /// At most one in-flight turn per identity.
    pub serialize_turns: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            window_size: 10,
            upstream_timeout: Duration::from_secs(120),
            require_auth: false,
            serialize_turns: true,
        }
    }
}

/// Outcome of a successful turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    /// Plan whose parameters were used.
    pub plan: Plan,
    /// Whether the turn was written to memory.
    pub remembered: bool,
}

/// Removes an identity's turn lock from the map once nobody else holds or
/// waits on it. Runs on drop, so a cancelled turn cleans up too.
struct TurnLockRelease<'a> {
    locks: &'a DashMap<IdentityId, Arc<Mutex<()>>>,
    identity_id: IdentityId,
}

impl Drop for TurnLockRelease<'_> {
    fn drop(&mut self) {
        self.locks
            .remove_if(&self.identity_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Orchestrates a chat turn across memory, prompt assembly, and generation.
///
/// Generic over the memory repository, turn recorder, and generator to keep
/// parley-core free of infrastructure dependencies.
pub struct ChatService<M: MemoryRepository, R: TurnRecorder, G: TextGenerator> {
    window: MemoryWindow<M>,
    assembler: PromptAssembler,
    recorder: R,
    generator: G,
    settings: ChatSettings,
    turn_locks: DashMap<IdentityId, Arc<Mutex<()>>>,
}

impl<M: MemoryRepository, R: TurnRecorder, G: TextGenerator> ChatService<M, R, G> {
    pub fn new(
        window: MemoryWindow<M>,
        assembler: PromptAssembler,
        recorder: R,
        generator: G,
        settings: ChatSettings,
    ) -> Self {
        Self {
            window,
            assembler,
            recorder,
            generator,
            settings,
            turn_locks: DashMap::new(),
        }
    }

    /// Access the memory window (for clear/inspect endpoints).
    pub fn window(&self) -> &MemoryWindow<M> {
        &self.window
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Run one chat turn for `caller` (or an anonymous caller).
    pub async fn chat(
        &self,
        caller: Option<&IdentitySummary>,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Validation("message cannot be empty".to_string()));
        }

        match caller {
            Some(identity) => self.chat_as(identity, message).await,
            None if self.settings.require_auth => Err(ChatError::Unauthenticated),
            None => {
                let request = self.assembler.build(Plan::Basic, &[], message);
                let text = self.generate(&request).await?;
                debug!("Anonymous chat turn served");
                Ok(ChatReply {
                    text,
                    plan: Plan::Basic,
                    remembered: false,
                })
            }
        }
    }

    async fn chat_as(
        &self,
        identity: &IdentitySummary,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        if !self.settings.serialize_turns {
            return self.run_turn(identity, message).await;
        }

        // Declared first so it drops after the guard and the lock handle.
        let _release = TurnLockRelease {
            locks: &self.turn_locks,
            identity_id: identity.id,
        };
        let lock = self
            .turn_locks
            .entry(identity.id)
            .or_default()
            .clone();
        let _guard = Arc::clone(&lock).lock_owned().await;

        self.run_turn(identity, message).await
    }

    async fn run_turn(
        &self,
        identity: &IdentitySummary,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let memory = self
            .window
            .fetch(&identity.id, self.settings.window_size)
            .await?;
        let request = self.assembler.build(identity.plan, &memory, message);

        let text = self.generate(&request).await?;

        self.recorder
            .record_turn(
                &identity.id,
                &NewMemoryEntry::user(message),
                &NewMemoryEntry::assistant(text.clone()),
                Utc::now(),
            )
            .await?;

        info!(
            identity_id = %identity.id,
            plan = %identity.plan,
            window = memory.len(),
            "Chat turn recorded"
        );

        Ok(ChatReply {
            text,
            plan: identity.plan,
            remembered: true,
        })
    }

    /// Call the generator under the configured deadline.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ChatError> {
        let deadline = self.settings.upstream_timeout;
        let after_secs = deadline.as_secs();

        match tokio::time::timeout(deadline, self.generator.generate(request)).await {
            Ok(Ok(output)) => Ok(output.text),
            Ok(Err(LlmError::Timeout)) | Err(_) => {
                warn!(generator = self.generator.name(), after_secs, "Text generation timed out");
                Err(ChatError::UpstreamTimeout { after_secs })
            }
            Ok(Err(e)) => {
                warn!(generator = self.generator.name(), error = %e, "Text generation failed");
                Err(ChatError::Upstream(e.to_string()))
            }
        }
    }
}
