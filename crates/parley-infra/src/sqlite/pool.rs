//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a bounded
//! reader pool for concurrent reads with a single-connection writer pool for
//! serialized writes. Both use WAL journal mode and enforce foreign keys.
//! Callers wait at most `acquire_timeout_secs` for a connection; after that
//! the repositories report `PoolExhausted`.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use parley_types::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (`max_connections`) for SELECT queries.
/// - `writer`: Single-connection pool for INSERT/UPDATE/DELETE and transactions.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools. Does not touch the schema; run [`DatabasePool::migrate`]
    /// explicitly (`parley migrate` or `parley serve --migrate`).
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect_with(base_opts.clone())
            .await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(base_opts.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }

    /// Apply pending versioned migrations on the writer.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.writer).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close both pools, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

/// Default database URL: `{data_dir}/parley.db`.
pub fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}", data_dir.join("parley.db").display())
}
