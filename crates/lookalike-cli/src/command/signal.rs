//! Cancellation on interrupt.

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_COMMAND;

/// Cancels `token` when SIGINT (Ctrl+C) or SIGTERM arrives.
///
/// Abort the returned handle once the guarded work is finished.
pub fn cancel_on_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = ctrl_c().await {
                tracing::error!(
                    target: TRACING_TARGET_COMMAND,
                    error = %e,
                    "Failed to install Ctrl+C handler"
                );
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match unix::signal(unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(
                        target: TRACING_TARGET_COMMAND,
                        error = %e,
                        "Failed to install SIGTERM handler"
                    );
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            "Received shutdown signal, cancelling"
        );
        token.cancel();
    })
}
