//! `parley serve` - run the HTTP API until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use parley_types::config::ParleyConfig;

use crate::http;
use crate::state::AppState;
use crate::sweep::spawn_session_sweep;

/// Options collected from the command line.
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub migrate: bool,
    pub quiet: bool,
}

/// Wire the application, bind the listener, and serve until shutdown.
pub async fn run(
    data_dir: PathBuf,
    config: ParleyConfig,
    options: ServeOptions,
) -> anyhow::Result<()> {
    let host = options
        .host
        .unwrap_or_else(|| config.server.host.clone());
    let port = options.port.unwrap_or(config.server.port);

    let state = AppState::init(data_dir, config).await?;
    if options.migrate {
        state.db_pool.migrate().await?;
    }

    let sweep = spawn_session_sweep(&state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Parley API listening");

    if !options.quiet {
        println!(
            "  {} Parley API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let shutdown = state.shutdown.clone();
    let db_pool = state.db_pool.clone();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Some(sweep) = sweep {
        let _ = sweep.await;
    }
    db_pool.close().await;

    if !options.quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
