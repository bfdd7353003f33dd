//! Plugin runtime - signal-driven reload and shutdown.

use tracing::{info, warn};

use super::AppState;

/// Schedule every world, then serve until Ctrl-C.
///
/// On Unix, SIGHUP reloads the settings.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    state.apply(state.settings.current().as_ref().clone()).await;

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangup = signal(SignalKind::hangup())?;
        info!("Running. Send SIGHUP to reload, Ctrl-C to stop.");
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    break;
                }
                _ = hangup.recv() => {
                    info!("SIGHUP received, reloading...");
                    state.reload().await;
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        info!("Running. Press Ctrl-C to stop.");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    }

    info!("Shutting down...");
    state.shutdown().await;
    Ok(())
}
