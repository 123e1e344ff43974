//! Server setup, rescheduled while the server is not ready.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use dsbridge_domain::error::DsBridgeError;

/// Outcome of bringing one server up.
#[derive(Debug)]
pub enum Setup<I> {
    Ready(I),
    /// The server needs user action and was left out.
    Skipped,
    /// Shutdown was requested while waiting for the server.
    Cancelled,
}

/// Run `attempt` until it succeeds, waiting `reschedule` after every
/// not-ready failure.
///
/// Any other error skips the server.
pub async fn with_reschedule<I, F, Fut>(
    host: &str,
    reschedule: Duration,
    shutdown: &mut watch::Receiver<bool>,
    mut attempt: F,
) -> Setup<I>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<I, DsBridgeError>>,
{
    loop {
        match attempt().await {
            Ok(integration) => return Setup::Ready(integration),
            Err(DsBridgeError::NotReady(err)) => {
                tracing::warn!(
                    host,
                    error = %err.source,
                    retry_in_secs = reschedule.as_secs(),
                    "digitalSTROM server not ready, rescheduling setup"
                );
                tokio::select! {
                    () = tokio::time::sleep(reschedule) => {}
                    _ = shutdown.wait_for(|stop| *stop) => return Setup::Cancelled,
                }
            }
            Err(DsBridgeError::Configuration(err)) => {
                tracing::error!(host, error = %err, "skipping digitalSTROM server");
                return Setup::Skipped;
            }
            Err(err) => {
                tracing::error!(host, error = ?err, "digitalSTROM server setup failed, skipping");
                return Setup::Skipped;
            }
        }
    }
}
