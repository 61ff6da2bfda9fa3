//! Cancellation and deadline signal threaded through a run.
//!
//! Built on a `tokio::sync::watch` channel so the signal is level-triggered:
//! a token observes cancellation no matter when it checks, and any number of
//! tokens can be handed out.

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owns the cancellation signal for one run.
#[derive(Clone)]
pub struct CancelController {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Get a token that observes this controller.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel programmatically.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Cancel once `deadline` has elapsed.
    pub fn cancel_after(&self, deadline: Duration) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            if !controller.is_cancelled() {
                tracing::warn!(?deadline, "deadline reached, cancelling run");
                controller.cancel();
            }
        })
    }

    /// Wait for SIGTERM or SIGINT, then cancel.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::warn!("failed to listen for SIGINT: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!("failed to install SIGTERM handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, cancelling run"); }
            _ = terminate => { tracing::info!("received SIGTERM, cancelling run"); }
        }

        self.cancel();
    }
}

impl Default for CancelController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`CancelController`].
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancelled. Pends forever if the controller is dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
