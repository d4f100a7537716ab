//! In-memory fakes for the repository, hashing, clock, and generator ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parley_types::error::{CredentialError, RepositoryError};
use parley_types::identity::{Identity, IdentityId, IdentitySummary, Plan};
use parley_types::llm::{GenerationOutput, GenerationRequest, LlmError};
use parley_types::memory::{MemoryEntry, NewMemoryEntry};
use parley_types::session::{Session, SessionToken};
use parley_types::usage::UsageStat;

use crate::llm::generator::TextGenerator;
use crate::repository::identity::IdentityRepository;
use crate::repository::memory::MemoryRepository;
use crate::repository::session::SessionRepository;
use crate::repository::turn::TurnRecorder;
use crate::repository::usage::UsageRepository;
use crate::service::clock::Clock;
use crate::service::hash::{PasswordHasher, TokenGenerator};

#[derive(Default)]
struct StoreState {
    identities: HashMap<IdentityId, Identity>,
    sessions: HashMap<String, Session>,
    memory: Vec<MemoryEntry>,
    next_memory_id: i64,
    usage: HashMap<IdentityId, UsageStat>,
    fail_writes: bool,
}

/// One shared in-memory store implementing every repository port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `RepositoryError::Connection`.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub fn memory_count(&self, identity_id: &IdentityId) -> usize {
        self.state
            .lock()
            .unwrap()
            .memory
            .iter()
            .filter(|e| e.identity_id == *identity_id)
            .count()
    }

    pub fn stored_hash(&self, identity_id: &IdentityId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .identities
            .get(identity_id)
            .map(|i| i.password_hash.clone())
    }

    fn check_writable(state: &StoreState) -> Result<(), RepositoryError> {
        if state.fail_writes {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }

    fn push_entry(
        state: &mut StoreState,
        identity_id: &IdentityId,
        entry: &NewMemoryEntry,
        created_at: DateTime<Utc>,
    ) -> MemoryEntry {
        state.next_memory_id += 1;
        let stored = MemoryEntry {
            id: state.next_memory_id,
            identity_id: *identity_id,
            role: entry.role,
            content: entry.content.clone(),
            created_at,
        };
        state.memory.push(stored.clone());
        stored
    }

    fn bump_usage(state: &mut StoreState, identity_id: &IdentityId, at: DateTime<Utc>) {
        let stat = state
            .usage
            .entry(*identity_id)
            .or_insert_with(|| UsageStat::empty(*identity_id));
        stat.messages_sent += 1;
        stat.messages_received += 1;
        stat.last_active_at = Some(at);
    }
}

impl IdentityRepository for InMemoryStore {
    async fn create(&self, identity: &Identity) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        if state.identities.values().any(|i| i.email == identity.email) {
            return Err(RepositoryError::Conflict(identity.email.clone()));
        }
        state.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.state.lock().unwrap().identities.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .identities
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn update_plan(&self, id: &IdentityId, plan: Plan) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        match state.identities.get_mut(id) {
            Some(identity) => {
                identity.plan = plan;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl SessionRepository for InMemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        if state.sessions.contains_key(&session.token_hash) {
            return Err(RepositoryError::Conflict("token".to_string()));
        }
        state
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find_with_identity(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Session, IdentitySummary)>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.sessions.get(token_hash).and_then(|session| {
            state
                .identities
                .get(&session.identity_id)
                .map(|identity| (session.clone(), identity.summary()))
        }))
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        Ok(state.sessions.remove(token_hash).is_some())
    }

    async fn delete_for_identity(&self, identity_id: &IdentityId) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.identity_id != *identity_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

impl MemoryRepository for InMemoryStore {
    async fn append(
        &self,
        identity_id: &IdentityId,
        entry: &NewMemoryEntry,
        created_at: DateTime<Utc>,
    ) -> Result<MemoryEntry, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        Ok(Self::push_entry(&mut state, identity_id, entry, created_at))
    }

    async fn recent(
        &self,
        identity_id: &IdentityId,
        limit: u32,
    ) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<MemoryEntry> = state
            .memory
            .iter()
            .filter(|e| e.identity_id == *identity_id)
            .rev()
            .take(limit as usize)
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }

    async fn clear(&self, identity_id: &IdentityId) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        let before = state.memory.len();
        state.memory.retain(|e| e.identity_id != *identity_id);
        Ok((before - state.memory.len()) as u64)
    }
}

impl UsageRepository for InMemoryStore {
    async fn increment(
        &self,
        identity_id: &IdentityId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        Self::bump_usage(&mut state, identity_id, at);
        Ok(())
    }

    async fn get(&self, identity_id: &IdentityId) -> Result<Option<UsageStat>, RepositoryError> {
        Ok(self.state.lock().unwrap().usage.get(identity_id).cloned())
    }
}

impl TurnRecorder for InMemoryStore {
    async fn record_turn(
        &self,
        identity_id: &IdentityId,
        user: &NewMemoryEntry,
        assistant: &NewMemoryEntry,
        at: DateTime<Utc>,
    ) -> Result<(MemoryEntry, MemoryEntry), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state)?;
        let user = Self::push_entry(&mut state, identity_id, user, at);
        let assistant = Self::push_entry(&mut state, identity_id, assistant, at);
        Self::bump_usage(&mut state, identity_id, at);
        Ok((user, assistant))
    }
}

/// Reversible stand-in for a real password hash. Never stores plaintext.
#[derive(Clone, Default)]
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("fake${}", password.chars().rev().collect::<String>()))
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
        let expected = self.hash(password).await?;
        Ok(expected == stored_hash)
    }

    async fn burn(&self, _password: &str) {}
}

/// Sequential tokens; optionally replays a fixed value first to force a collision.
#[derive(Default)]
pub struct SequentialTokens {
    counter: AtomicU64,
    repeat_first: u64,
}

impl SequentialTokens {
    /// The first `n` calls to `generate` return the same token.
    pub fn repeating_first(n: u64) -> Self {
        Self {
            counter: AtomicU64::new(0),
            repeat_first: n,
        }
    }
}

impl TokenGenerator for SequentialTokens {
    fn generate(&self) -> SessionToken {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let n = n.saturating_sub(self.repeat_first.saturating_sub(1));
        SessionToken::new(format!("token-{n:04}"))
    }

    fn digest(&self, token: &str) -> String {
        format!("digest:{token}")
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc::now())),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Clone)]
pub enum Script {
    /// Reply with a fixed text.
    Reply(String),
    /// Fail with the given error.
    Fail(LlmError),
    /// Sleep, then reply.
    Slow(Duration, String),
}

/// Generator that records every request and answers from a script.
#[derive(Clone)]
pub struct ScriptedGenerator {
    script: Arc<Mutex<Script>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedGenerator {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }
}

impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Reply(text) => Ok(GenerationOutput { text }),
            Script::Fail(err) => Err(err),
            Script::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(GenerationOutput { text })
            }
        }
    }
}
