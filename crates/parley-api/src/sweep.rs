//! Background purge of expired session records.
//!
//! Validity never depends on this task; it only keeps the sessions table
//! from growing without bound.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::AppState;

/// Spawn the sweep loop. Returns `None` when `auth.sweep_interval_secs` is 0.
///
/// The loop exits when `state.shutdown` is cancelled.
pub fn spawn_session_sweep(state: &AppState) -> Option<JoinHandle<()>> {
    let interval_secs = state.config.auth.sweep_interval_secs;
    if interval_secs == 0 {
        debug!("Session sweep disabled");
        return None;
    }

    let sessions = state.sessions.clone();
    let shutdown = state.shutdown.clone();

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Session sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = sessions.purge_expired().await {
                        warn!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
    }))
}
