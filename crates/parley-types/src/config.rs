//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `parley.toml`. Every field has a
//! default so an empty or missing file yields a working local setup.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::identity::Plan;
use crate::llm::GenerationParams;

/// Top-level configuration for the Parley service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub plans: PlanTable,
}

impl ParleyConfig {
    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            return Err(format!(
                "auth.session_ttl_hours must be within 1..={MAX_SESSION_TTL_HOURS}"
            ));
        }
        if self.memory.window_size == 0 {
            return Err("memory.window_size must be positive".to_string());
        }
        if self.generation.timeout_secs == 0 {
            return Err("generation.timeout_secs must be positive".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("database.max_connections must be positive".to_string());
        }
        self.plans.validate()
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of static assets to serve for unknown paths, if it exists.
    #[serde(default)]
    pub web_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: None,
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL. When absent, `{data_dir}/parley.db` is used.
    #[serde(default)]
    pub url: Option<String>,
    /// Upper bound on concurrent reader connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a caller waits for a free connection before failing.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    8
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365 * 10;

/// `[auth]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    /// When false, anonymous callers may chat with an empty memory window.
    #[serde(default)]
    pub require_auth_for_chat: bool,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Interval of the expired-session sweep. 0 disables it.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_session_ttl_hours() -> u64 {
    DEFAULT_SESSION_TTL_HOURS
}

fn default_cookie_name() -> String {
    "parley_session".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl AuthConfig {
    /// Session lifetime as a time delta, `None` if it does not fit.
    pub fn session_ttl(&self) -> Option<TimeDelta> {
        i64::try_from(self.session_ttl_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            require_auth_for_chat: false,
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// `[memory]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of most recent entries fed into each prompt.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Allow at most one in-flight chat turn per identity.
    #[serde(default = "default_serialize_turns")]
    pub serialize_turns: bool,
}

fn default_window_size() -> usize {
    10
}

fn default_serialize_turns() -> bool {
    true
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            serialize_turns: default_serialize_turns(),
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Deadline for a single generation call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_preamble")]
    pub preamble: String,
    #[serde(default = "default_response_cue")]
    pub response_cue: String,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_preamble() -> String {
    "You are Parley, a friendly and concise assistant. \
     Use the conversation so far as context for your answer."
        .to_string()
}

fn default_response_cue() -> String {
    "assistant:".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            preamble: default_preamble(),
            response_cue: default_response_cue(),
        }
    }
}

/// `[plans.basic]` / `[plans.premium]` generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTable {
    #[serde(default = "default_basic_tier")]
    pub basic: PlanTier,
    #[serde(default = "default_premium_tier")]
    pub premium: PlanTier,
}

/// Generation parameters for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanTier {
    pub max_tokens: u32,
    pub temperature: f32,
}

fn default_basic_tier() -> PlanTier {
    PlanTier {
        max_tokens: 200,
        temperature: 0.2,
    }
}

fn default_premium_tier() -> PlanTier {
    PlanTier {
        max_tokens: 512,
        temperature: 0.1,
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self {
            basic: default_basic_tier(),
            premium: default_premium_tier(),
        }
    }
}

impl PlanTable {
    /// Generation parameters for a plan. Total over both plan values.
    pub fn params_for(&self, plan: Plan) -> GenerationParams {
        let tier = match plan {
            Plan::Basic => self.basic,
            Plan::Premium => self.premium,
        };
        GenerationParams {
            max_tokens: tier.max_tokens,
            temperature: tier.temperature,
        }
    }

    /// Premium must get a strictly larger budget and a temperature no higher
    /// than basic.
    pub fn validate(&self) -> Result<(), String> {
        if self.basic.max_tokens == 0 {
            return Err("plans.basic.max_tokens must be positive".to_string());
        }
        if self.premium.max_tokens <= self.basic.max_tokens {
            return Err(format!(
                "plans.premium.max_tokens ({}) must exceed plans.basic.max_tokens ({})",
                self.premium.max_tokens, self.basic.max_tokens
            ));
        }
        for (name, tier) in [("basic", self.basic), ("premium", self.premium)] {
            if !tier.temperature.is_finite() || !(0.0..=2.0).contains(&tier.temperature) {
                return Err(format!("plans.{name}.temperature must be within 0.0..=2.0"));
            }
        }
        if self.premium.temperature > self.basic.temperature {
            return Err(format!(
                "plans.premium.temperature ({}) must not exceed plans.basic.temperature ({})",
                self.premium.temperature, self.basic.temperature
            ));
        }
        Ok(())
    }
}
