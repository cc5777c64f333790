use tokio::sync::{AcquireError, Mutex, Semaphore, SemaphorePermit};

use crate::config::RateLimit;

/// Request pacing shared by every fetch of one client.
///
/// Caps requests in flight, delays each dispatch, and pauses every
/// `batch_pause_every` requests. The counter is only touched under its mutex,
/// and the batch pause is taken while holding it, so concurrent callers can
/// neither skip nor double a pause.
pub struct RateLimiter {
    permits: Semaphore,
    requests: Mutex<u64>,
    settings: RateLimit,
}

impl RateLimiter {
    pub fn new(settings: RateLimit) -> Self {
        Self {
            permits: Semaphore::new(settings.max_concurrent.max(1)),
            requests: Mutex::new(0),
            settings,
        }
    }

    /// Wait for a dispatch slot. The request must be sent while the returned
    /// permit is alive.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        let permit = self.permits.acquire().await?;

        tokio::time::sleep(self.settings.request_delay()).await;

        let mut requests = self.requests.lock().await;
        *requests += 1;
        let every = self.settings.batch_pause_every;
        if every > 0 && *requests % every == 0 {
            tracing::info!(requests = *requests, "rate limit pause");
            tokio::time::sleep(self.settings.batch_pause()).await;
        }

        Ok(permit)
    }

    pub async fn requests_sent(&self) -> u64 {
        *self.requests.lock().await
    }

    pub fn settings(&self) -> &RateLimit {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_settings(max_concurrent: usize) -> RateLimit {
        RateLimit {
            max_concurrent,
            request_delay_ms: 1,
            batch_pause_every: 4,
            batch_pause_ms: 1,
            cooldown_ms: 1,
        }
    }

    #[tokio::test]
    async fn counts_every_request() {
        let limiter = RateLimiter::new(fast_settings(3));
        for _ in 0..9 {
            let _permit = limiter.acquire().await.unwrap();
        }
        assert_eq!(limiter.requests_sent().await, 9);
    }

    #[tokio::test]
    async fn never_exceeds_concurrency_cap() {
        let limiter = Arc::new(RateLimiter::new(fast_settings(3)));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..12 {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            tasks.spawn(async move {
                let _permit = limiter.acquire().await.unwrap();
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            });
        }
        while tasks.join_next().await.is_some() {}

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(limiter.requests_sent().await, 12);
    }

    fn paced(max_concurrent: usize, request_delay_ms: u64) -> RateLimit {
        RateLimit {
            max_concurrent,
            request_delay_ms,
            batch_pause_every: 4,
            batch_pause_ms: 1000,
            cooldown_ms: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_requests_pay_delay_and_batch_pauses() {
        let limiter = RateLimiter::new(paced(3, 100));
        let start = tokio::time::Instant::now();
        for _ in 0..9 {
            let _permit = limiter.acquire().await.unwrap();
        }
        // 9 delays of 100ms, pauses after requests 4 and 8.
        assert_eq!(start.elapsed(), Duration::from_millis(9 * 100 + 2 * 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_requests_share_one_pause_per_batch() {
        for (requests, pauses) in [(12u64, 3u64), (10, 2), (3, 0)] {
            let limiter = Arc::new(RateLimiter::new(paced(3, 0)));
            let start = tokio::time::Instant::now();

            let mut tasks = tokio::task::JoinSet::new();
            for _ in 0..requests {
                let limiter = Arc::clone(&limiter);
                tasks.spawn(async move {
                    let _permit = limiter.acquire().await.unwrap();
                });
            }
            while tasks.join_next().await.is_some() {}

            // Pauses are serialized under the counter lock, so they add up.
            assert_eq!(limiter.requests_sent().await, requests);
            assert_eq!(start.elapsed(), Duration::from_millis(pauses * 1000), "{requests} requests");
        }
    }

    #[tokio::test]
    async fn zero_concurrency_still_admits_one() {
        let limiter = RateLimiter::new(fast_settings(0));
        let _permit = limiter.acquire().await.unwrap();
        assert_eq!(limiter.requests_sent().await, 1);
    }
}
