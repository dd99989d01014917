use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces requests at least `min_interval` apart. Free geocoding tiers allow
/// as little as one request per second.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn per_second(requests: u32) -> Self {
        Self::new(Duration::from_secs(1) / requests.max(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next request may go out and claims that slot.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!("Rate limited, waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let started = Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(40));
        let started = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_per_second() {
        assert_eq!(RateLimiter::per_second(1).min_interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::per_second(4).min_interval(), Duration::from_millis(250));
        assert_eq!(RateLimiter::per_second(0).min_interval(), Duration::from_secs(1));
    }
}
