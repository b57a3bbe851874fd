use crate::ports::outbound::CloudApiError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Resource Graph envelope: at most 14 tokens, 10 available at start,
/// 10 restored every 5 seconds.
pub const GRAPH_CAPACITY: u32 = 14;
pub const GRAPH_INITIAL_TOKENS: u32 = 10;
pub const GRAPH_REFILL_AMOUNT: u32 = 10;
pub const GRAPH_REFILL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    next_refill: Instant,
}

/// Token bucket shared by every graph caller of a run
///
/// Refills happen on a fixed schedule anchored at construction. Waiters
/// queue on a fair mutex, so tokens are handed out in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    refill_amount: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(capacity: u32, initial_tokens: u32, refill_amount: u32, refill_interval: Duration) -> Self {
        Self {
            capacity,
            refill_amount,
            refill_interval,
            state: Mutex::new(BucketState {
                tokens: initial_tokens.min(capacity),
                next_refill: Instant::now() + refill_interval,
            }),
        }
    }

    /// Limiter tuned to the Resource Graph query quota
    pub fn for_resource_graph() -> Self {
        Self::new(
            GRAPH_CAPACITY,
            GRAPH_INITIAL_TOKENS,
            GRAPH_REFILL_AMOUNT,
            GRAPH_REFILL_INTERVAL,
        )
    }

    /// Takes one token, waiting for the next refill when the bucket is empty
    ///
    /// # Errors
    /// Returns `CloudApiError::Cancelled` if `cancel` fires while waiting
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), CloudApiError> {
        let mut state = tokio::select! {
            _ = cancel.cancelled() => return Err(CloudApiError::Cancelled),
            guard = self.state.lock() => guard,
        };

        loop {
            self.refill(&mut state, Instant::now());
            if state.tokens > 0 {
                state.tokens -= 1;
                return Ok(());
            }

            let wake_at = state.next_refill;
            tokio::select! {
                _ = cancel.cancelled() => return Err(CloudApiError::Cancelled),
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    /// Tokens currently available, after applying due refills
    pub async fn available(&self) -> u32 {
        let mut state = self.state.lock().await;
        self.refill(&mut state, Instant::now());
        state.tokens
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        while now >= state.next_refill {
            state.tokens = (state.tokens + self.refill_amount).min(self.capacity);
            state.next_refill += self.refill_interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_initial_burst_then_wait_for_refill() {
        let limiter = RateLimiter::for_resource_graph();
        let cancel = CancellationToken::new();
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire(&cancel).await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_bucket_caps_at_capacity() {
        let limiter = RateLimiter::for_resource_graph();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(limiter.available().await, GRAPH_CAPACITY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting() {
        let limiter = Arc::new(RateLimiter::new(1, 0, 1, Duration::from_secs(3600)));
        let cancel = CancellationToken::new();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(CloudApiError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_aligned_windows_stay_within_budget() {
        let limiter = Arc::new(RateLimiter::for_resource_graph());
        let cancel = CancellationToken::new();
        let origin = Instant::now();

        // Idle for a while so the bucket fills to capacity, then hammer it
        tokio::time::sleep(Duration::from_secs(12)).await;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let mut stamps = Vec::new();
                for _ in 0..8 {
                    limiter.acquire(&cancel).await.unwrap();
                    stamps.push(origin.elapsed());
                }
                stamps
            });
        }

        let mut stamps = Vec::new();
        while let Some(batch) = tasks.join_next().await {
            stamps.extend(batch.unwrap());
        }
        assert_eq!(stamps.len(), 80);

        let count_in = |from: Duration, len: Duration| {
            stamps.iter().filter(|t| **t >= from && **t < from + len).count()
        };
        for k in 0..10u64 {
            let from = GRAPH_REFILL_INTERVAL * k as u32;
            assert!(count_in(from, Duration::from_secs(5)) <= 14, "5s window at {:?}", from);
            assert!(count_in(from, Duration::from_secs(10)) <= 24, "10s window at {:?}", from);
        }
    }
}
