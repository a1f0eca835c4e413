//! Client-side request budget
//!
//! Token bucket over the governor crate. Salesforce enforces a rolling
//! daily API quota; spreading page requests keeps long batch reads from
//! tripping `REQUEST_LIMIT_EXCEEDED` in bursts.

use crate::config::HttpConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a limiter; zero values are clamped to one
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rps).allow_burst(burst);

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Create a limiter from HTTP settings
    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.requests_per_second, config.burst_size)
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

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_allows_burst() {
        let limiter = RateLimiter::new(10, 5);

        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_zero_is_clamped() {
        let limiter = RateLimiter::new(0, 0);
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait_within_burst() {
        let limiter = RateLimiter::from_config(&HttpConfig::default());
        limiter.wait().await;
    }
}
