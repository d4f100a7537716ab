//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, then either applies database
//! migrations or starts the REST API server.

mod cli;
mod http;
mod state;
mod sweep;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use parley_infra::config::{load_config, resolve_data_dir};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet && cli.verbose == 0 {
        "error"
    } else {
        parley_observe::filter_for_verbosity(cli.verbose)
    };
    parley_observe::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let config = load_config(&data_dir).await?;

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            migrate,
        } => {
            cli::serve::run(
                data_dir,
                config,
                cli::serve::ServeOptions {
                    host,
                    port,
                    migrate,
                    quiet: cli.quiet,
                },
            )
            .await
        }
        Commands::Migrate => cli::migrate::run(&data_dir, &config, cli.quiet).await,
        Commands::Completions { .. } => Ok(()),
    };

    parley_observe::shutdown_tracing();
    result
}
