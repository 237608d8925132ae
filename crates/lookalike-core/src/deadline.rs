//! Bounded waits on external collaborators.

use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// Default upper bound for a single collaborator call: 10 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Awaits `future`, failing with a dependency error once `limit` elapses.
///
/// A `None` limit waits indefinitely. Timed-out calls are not retried.
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(limit) = limit else {
        return future.await;
    };

    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(elapsed) => Err(Error::dependency()
            .with_message(format!(
                "{operation} timed out after {}ms",
                limit.as_millis()
            ))
            .with_source(elapsed)),
    }
}
