//! Application state wiring all services together.
//!
//! Services are generic over repository/hasher/generator traits; AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use parley_core::chat::service::{ChatService, ChatSettings};
use parley_core::service::clock::SystemClock;
use parley_core::service::credential::CredentialStore;
use parley_core::service::memory::MemoryWindow;
use parley_core::service::prompt::PromptAssembler;
use parley_core::service::session::SessionManager;
use parley_core::service::usage::UsageCounter;
use parley_infra::config::database_url;
use parley_infra::crypto::password::Argon2PasswordHasher;
use parley_infra::crypto::token::RandomTokenGenerator;
use parley_infra::llm::completions::CompletionsGenerator;
use parley_infra::sqlite::identity::SqliteIdentityRepository;
use parley_infra::sqlite::memory::SqliteMemoryRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::session::SqliteSessionRepository;
use parley_infra::sqlite::turn::SqliteTurnRecorder;
use parley_infra::sqlite::usage::SqliteUsageRepository;
use parley_types::config::ParleyConfig;
use tokio_util::sync::CancellationToken;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteCredentialStore = CredentialStore<SqliteIdentityRepository, Argon2PasswordHasher>;

pub type ConcreteSessionManager =
    SessionManager<SqliteSessionRepository, RandomTokenGenerator, SystemClock>;

pub type ConcreteUsageCounter = UsageCounter<SqliteUsageRepository>;

pub type ConcreteChatService =
    ChatService<SqliteMemoryRepository, SqliteTurnRecorder, CompletionsGenerator>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<ConcreteCredentialStore>,
    pub sessions: Arc<ConcreteSessionManager>,
    pub usage: Arc<ConcreteUsageCounter>,
    pub chat: Arc<ConcreteChatService>,
    pub config: Arc<ParleyConfig>,
    pub db_pool: DatabasePool,
    /// Cancelled on shutdown to stop background tasks.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Connect to the database and wire services from `config`.
    pub async fn init(data_dir: PathBuf, config: ParleyConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::connect(&db_url, &config.database).await?;
        let generator = CompletionsGenerator::from_config(&config.generation)?;

        Self::build(db_pool, config, generator)
    }

    /// Wire services over an already opened pool.
    pub fn build(
        db_pool: DatabasePool,
        config: ParleyConfig,
        generator: CompletionsGenerator,
    ) -> anyhow::Result<Self> {
        let session_ttl = config
            .auth
            .session_ttl()
            .context("auth.session_ttl_hours is out of range")?;

        let credentials = CredentialStore::new(
            SqliteIdentityRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
        );

        let sessions = SessionManager::new(
            SqliteSessionRepository::new(db_pool.clone()),
            RandomTokenGenerator::new(),
            SystemClock,
            session_ttl,
        );

        let usage = UsageCounter::new(SqliteUsageRepository::new(db_pool.clone()));

        let assembler = PromptAssembler::new(
            config.generation.preamble.clone(),
            config.generation.response_cue.clone(),
            config.plans.clone(),
        );
        let chat = ChatService::new(
            MemoryWindow::new(SqliteMemoryRepository::new(db_pool.clone())),
            assembler,
            SqliteTurnRecorder::new(db_pool.clone()),
            generator,
            ChatSettings {
                window_size: config.memory.window_size,
                upstream_timeout: Duration::from_secs(config.generation.timeout_secs),
                require_auth: config.auth.require_auth_for_chat,
                serialize_turns: config.memory.serialize_turns,
            },
        );

        Ok(Self {
            credentials: Arc::new(credentials),
            sessions: Arc::new(sessions),
            usage: Arc::new(usage),
            chat: Arc::new(chat),
            config: Arc::new(config),
            db_pool,
            shutdown: CancellationToken::new(),
        })
    }
}
