//! Caller-level timeout with weak cancellation.

use crate::error::{DomainError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Race `operation` against a timer.
///
/// On expiry the result is a `Timeout` error, and the in-flight operation is
/// deliberately NOT cancelled: it was spawned as a task, and dropping its
/// [`JoinHandle`] detaches it, so it continues unobserved in the background
/// with its eventual outcome discarded. Callers that need hard cancellation
/// must arrange it themselves.
pub async fn deadline<T, F>(limit: Duration, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle: JoinHandle<Result<T>> = tokio::spawn(future);
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(DomainError::new(
            crate::error::ErrorKind::Unknown,
            operation,
            format!("operation task failed: {join_err}"),
        )),
        Err(_elapsed) => {
            warn!(operation, limit_ms = limit.as_millis() as u64, "deadline expired");
            Err(DomainError::timeout(
                operation,
                format!("operation timed out after {}s", limit.as_secs_f64()),
            ))
        }
    }
}
