//! `parley migrate` - apply pending schema migrations.

use std::path::Path;

use parley_infra::config::database_url;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::config::ParleyConfig;

/// Open the configured database and apply pending migrations.
pub async fn run(data_dir: &Path, config: &ParleyConfig, quiet: bool) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;

    let url = database_url(config, data_dir);
    let pool = DatabasePool::connect(&url, &config.database).await?;
    pool.migrate().await?;
    pool.close().await;

    if !quiet {
        println!(
            "  {} Database schema is up to date",
            console::style("✓").green().bold()
        );
    }
    Ok(())
}
