//! Exponential-backoff retry engine.
//!
//! Wraps one async operation in an explicit retry loop. The delay before
//! retry `n` (1-based) is `base_delay * 2^(n-1)` plus, when jitter is
//! enabled, a uniform random component in `[0, base_delay)`.

use crate::error::{ApiError, kind_of};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Immutable retry policy, attached per call site.
pub struct RetryPolicy<E> {
    max_attempts: u32,
    base_delay: Duration,
    jitter: bool,
    retryable: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            jitter: self.jitter,
            retryable: Arc::clone(&self.retryable),
        }
    }
}

impl<E> RetryPolicy<E> {
    /// Policy that treats every error as retryable. `max_attempts` counts the
    /// first attempt, so `1` performs no retries at all.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            jitter: true,
            retryable: Arc::new(|_| true),
        }
    }

    /// Replace the retryable predicate.
    pub fn retry_if(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.retryable = Arc::new(predicate);
        self
    }

    /// Disable the random jitter component. Delays become exactly
    /// `base_delay * 2^(n-1)`.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        let exponential = self.base_delay.saturating_mul(1u32 << shift);
        if self.jitter {
            exponential + self.base_delay.mul_f64(rand::random::<f64>())
        } else {
            exponential
        }
    }
}

impl RetryPolicy<ApiError> {
    /// Default policy for provider calls: three attempts, retrying only
    /// transient failures (throttling, timeout). Validation and permission
    /// failures are never retried.
    pub fn transient() -> Self {
        Self::new(3, Duration::from_millis(200)).retry_if(|api| kind_of(api).is_transient())
    }
}

impl Default for RetryPolicy<ApiError> {
    fn default() -> Self {
        Self::transient()
    }
}

/// Execute `operation` under `policy`.
///
/// The final underlying error is propagated unchanged; exhausting attempts is
/// not a separate error kind.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy<E>, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with(policy, operation, |_, _| {}).await
}

/// [`retry`] with a notification hook.
///
/// `on_retry(error, attempt)` fires before each sleep with the 1-based number
/// of the attempt that just failed. The hook is for progress text only: it is
/// infallible by construction and never influences control flow.
pub async fn retry_with<T, E, F, Fut, H>(
    policy: &RetryPolicy<E>,
    mut operation: F,
    mut on_retry: H,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnMut(&E, u32),
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !(policy.retryable)(&err) {
                    return Err(err);
                }
                on_retry(&err, attempt);
                let delay = policy.delay_for(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn failing_api_error() -> ApiError {
        ApiError::new("Rate exceeded").with_code("Throttling")
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_operation_runs_exactly_max_attempts() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), ApiError> = retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(failing_api_error())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_double_without_jitter() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100)).without_jitter();
        let start = Instant::now();

        let _: Result<(), ApiError> =
            retry(&policy, || async { Err(failing_api_error()) }).await;

        // Three sleeps: 100 + 200 + 400 ms.
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn jittered_delays_stay_within_the_doubling_window() {
        let base = Duration::from_millis(100);
        let policy = RetryPolicy::new(4, base);
        let start = Instant::now();

        let _: Result<(), ApiError> =
            retry(&policy, || async { Err(failing_api_error()) }).await;

        // Each sleep k is in [base * 2^(k-1), base * 2^k), so the total of
        // three sleeps is in [700ms, 1000ms).
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(700), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1000), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60));
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let start = Instant::now();

        let result: Result<(), ApiError> = retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(failing_api_error())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_is_not_attempted_twice() {
        let policy = RetryPolicy::<ApiError>::transient();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), ApiError> = retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::new("denied").with_code("AccessDenied"))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().code.as_deref(), Some("AccessDenied"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_policy_recovers_after_throttling() {
        let policy = RetryPolicy::<ApiError>::transient();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result = retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(failing_api_error())
                } else {
                    Ok(99)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 99);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn on_retry_sees_each_failed_attempt_number() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10)).without_jitter();
        let mut seen = Vec::new();

        let result: Result<(), ApiError> = retry_with(
            &policy,
            || async { Err(failing_api_error()) },
            |_, attempt| seen.push(attempt),
        )
        .await;

        assert!(result.is_err());
        // Two retries after attempts 1 and 2; the final failure has no hook.
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn final_error_is_propagated_unchanged() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10)).without_jitter();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), ApiError> = retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::new(format!("failure #{n}")).with_code("Throttling"))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().message, "failure #1");
    }
}
