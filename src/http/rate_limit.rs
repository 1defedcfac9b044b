//! Rate limiting implementation
//!
//! Marketo enforces a rolling quota of calls per window (100 calls per 20
//! seconds by default). The limiter spreads requests over that window with
//! the governor crate's token bucket.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Calls allowed per window
    pub max_calls: u32,
    /// Length of the quota window
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_calls: 100,
            window: Duration::from_secs(20),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self { max_calls, window }
    }

    fn quota(&self) -> Quota {
        let calls = NonZeroU32::new(self.max_calls).unwrap_or(NonZeroU32::MIN);
        let period = self.window / calls.get();
        Quota::with_period(period.max(Duration::from_nanos(1)))
            .unwrap_or_else(|| Quota::per_second(calls))
            .allow_burst(calls)
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_default_matches_marketo_quota() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.max_calls, 100);
        assert_eq!(config.window, Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst_up_to_quota() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(5, Duration::from_secs(60)));

        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait_within_burst() {
        let limiter = RateLimiter::default();
        tokio::time::timeout(Duration::from_millis(100), limiter.wait())
            .await
            .expect("first call should not block");
    }

    #[test]
    fn test_zero_calls_falls_back_to_one() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, Duration::from_secs(60)));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
