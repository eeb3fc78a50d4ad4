//! Exact per-key sliding window limiter.
//!
//! Every accepted request's timestamp is kept until it leaves the window, so
//! no window of length `window` ever contains more than `max_requests`
//! accepted requests for a key. Limits are per-process.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use folio_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use super::RateLimitConfig;

/// Above this many tracked keys, idle keys are swept on the next check.
const SWEEP_THRESHOLD: usize = 10_000;

pub struct SlidingWindowRateLimiter {
    config: RateLimitConfig,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.max_requests == 0 {
            return Err(RateLimitError::Config(
                "max_requests must be at least 1".to_string(),
            ));
        }
        if config.window.is_zero() {
            return Err(RateLimitError::Config("window must be non-zero".to_string()));
        }
        Ok(Self {
            config,
            hits: Mutex::new(HashMap::new()),
        })
    }

    /// Number of clients currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.hits.lock().await.len()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let window = self.config.window;
        let max = self.config.max_requests as usize;
        let mut hits = self.hits.lock().await;

        if hits.len() >= SWEEP_THRESHOLD {
            hits.retain(|_, times| times.back().is_some_and(|t| now - *t < window));
        }

        let times = hits.entry(key.to_string()).or_default();
        while times.front().is_some_and(|t| now - *t >= window) {
            times.pop_front();
        }

        if times.len() < max {
            times.push_back(now);
            return Ok(RateLimitResult {
                allowed: true,
                remaining: (max - times.len()) as u32,
                reset_after: window,
            });
        }

        let oldest = times.front().copied().unwrap_or(now);
        let reset_after = window.saturating_sub(now - oldest).max(Duration::from_secs(1));
        Ok(RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_after,
        })
    }

    fn limit(&self) -> u32 {
        self.config.max_requests
    }
}
