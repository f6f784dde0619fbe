use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::errors::{AppError, AppResult};

/// Process-wide interrupt. Once the listener is running, SIGINT no longer
/// kills the process, so every remote call must be raced against the token.
#[derive(Clone)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel the token on the first Ctrl+C, or SIGTERM on unix.
    pub fn spawn_signal_listener(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                r = tokio::signal::ctrl_c() => {
                    if let Err(e) = r {
                        tracing::debug!(error = %e, "cannot listen for ctrl-c");
                        return;
                    }
                    tracing::debug!(signal = "SIGINT", "cancelling outstanding requests");
                }
                _ = terminated() => {
                    tracing::debug!(signal = "SIGTERM", "cancelling outstanding requests");
                }
            }
            shutdown.cancel();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `fut` unless `cancel` fires first, in which case `fut` is dropped.
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        r = fut => r,
        _ = cancel.cancelled() => Err(AppError::Interrupted),
    }
}

#[cfg(unix)]
async fn terminated() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sig) => {
            sig.recv().await;
        }
        Err(_) => std::future::pending().await,
    }
}

#[cfg(not(unix))]
async fn terminated() {
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_token() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();
        shutdown.clone().cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_token_drops_a_pending_call() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let r = until_cancelled(&cancel, std::future::pending::<AppResult<()>>()).await;
        assert!(matches!(r, Err(AppError::Interrupted)));
    }

    #[tokio::test]
    async fn finished_call_wins_over_live_token() {
        let cancel = CancellationToken::new();
        let r = until_cancelled(&cancel, async { Ok(7) }).await;
        assert_eq!(r.unwrap(), 7);
    }
}
