use crate::ports::outbound::CloudApiError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Exponential backoff for transient provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(20),
            multiplier: 2,
            max_delay: Duration::from_secs(600),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. A throttled response's retry-after hint is honoured
    /// when it is longer than the computed backoff.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, CloudApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CloudApiError>>,
    {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(CloudApiError::Cancelled);
            }

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if !error.is_transient() || attempt >= self.max_attempts {
                return Err(error);
            }

            let mut delay = self.delay_for(attempt);
            if let CloudApiError::Throttled {
                retry_after: Some(hint),
            } = &error
            {
                delay = delay.max(*hint).min(self.max_delay);
            }
            debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "retrying");

            tokio::select! {
                _ = cancel.cancelled() => return Err(CloudApiError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for(3), Duration::from_millis(80));
        assert_eq!(policy.delay_for(40), Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retry_until_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = RetryPolicy::default()
            .run(&CancellationToken::new(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CloudApiError::Server {
                    status: 503,
                    message: "busy".into(),
                })
            })
            .await;
        assert!(matches!(result, Err(CloudApiError::Server { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::default()
            .run(&CancellationToken::new(), move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(CloudApiError::Network("reset".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = RetryPolicy::default()
            .run(&CancellationToken::new(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CloudApiError::Rejected {
                    status: 403,
                    code: "AuthorizationFailed".into(),
                    message: "denied".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), _> = RetryPolicy::default()
            .run(&cancel, || async { Ok(()) })
            .await;
        assert!(matches!(result, Err(CloudApiError::Cancelled)));
    }
}
