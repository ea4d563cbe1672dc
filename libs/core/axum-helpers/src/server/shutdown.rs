use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Fan-out of the stop signal to the server and any background tasks.
///
/// Cloning is cheap; every clone observes the same state.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip to shutting-down. Only the first call logs.
    pub fn shutdown(&self) {
        let changed = self.tx.send_if_modified(|state| !std::mem::replace(state, true));
        if changed {
            info!("initiating graceful shutdown");
        }
    }

    /// Resolve once [`shutdown`](Self::shutdown) has been called.
    pub async fn notified(&self) {
        let mut rx = self.tx.subscribe();
        // Only fails if the sender is gone, and `self` holds it.
        let _ = rx.wait_for(|stopping| *stopping).await;
    }

    /// Wait for SIGINT/SIGTERM, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        tokio::select! {
            _ = shutdown_signal() => self.shutdown(),
            _ = self.notified() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored, leaving the other one active.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received SIGINT"),
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received SIGTERM");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
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
}
