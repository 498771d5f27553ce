use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancel `token` once `after` has elapsed.
///
/// The returned task finishes early if the token is cancelled by someone else.
pub fn spawn_deadline(token: CancellationToken, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(after) => {
                info!(after_ms = after.as_millis() as u64, "deadline reached; cancelling");
                token.cancel();
            }
        }
    })
}
