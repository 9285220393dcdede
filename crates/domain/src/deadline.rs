use std::future::Future;
use std::time::Duration;

use crate::error::OrderError;

/// Default deadline applied to every collaborator call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Awaits a store call, failing with [`OrderError::Timeout`] once `after` elapses.
///
/// The inner future is dropped on timeout, which cancels the call.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    after: Duration,
    call: F,
) -> Result<T, OrderError>
where
    F: Future<Output = order_store::Result<T>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!(operation, ?after, "store call timed out");
            Err(OrderError::Timeout { operation, after })
        }
    }
}
