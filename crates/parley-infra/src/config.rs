//! Configuration loader for Parley.
//!
//! Reads `parley.toml` from the data directory (`~/.parley/` by default,
//! overridable with `PARLEY_DATA_DIR`) and deserializes it into
//! [`ParleyConfig`]. A missing or malformed file falls back to defaults; a
//! file that parses but violates cross-field constraints is rejected.

use std::path::{Path, PathBuf};

use anyhow::Context;
use parley_types::config::ParleyConfig;

use crate::sqlite::pool::default_database_url;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "parley.toml";

/// Resolve the data directory: `PARLEY_DATA_DIR`, else `~/.parley`, else `./.parley`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".parley")
}

/// Load configuration from `{data_dir}/parley.toml`.
///
/// - If the file does not exist, returns [`ParleyConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the parsed config fails validation, returns an error.
pub async fn load_config(data_dir: &Path) -> anyhow::Result<ParleyConfig> {
    let config_path = data_dir.join(CONFIG_FILE);

    let config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<ParleyConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                ParleyConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE} found at {}, using defaults", config_path.display());
            ParleyConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            ParleyConfig::default()
        }
    };

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    Ok(config)
}

/// The database URL to open: the configured one, else `{data_dir}/parley.db`.
pub fn database_url(config: &ParleyConfig, data_dir: &Path) -> String {
    config
        .database
        .url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}
