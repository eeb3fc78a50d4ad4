//! Rate limiting implementations.

mod sliding;

pub use sliding::SlidingWindowRateLimiter;

#[cfg(feature = "rate-limit")]
mod memory;
#[cfg(feature = "rate-limit")]
pub use memory::GcraRateLimiter;

use std::time::Duration;

/// Requests allowed per client within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Contact form submissions: 5 per 15 minutes.
    pub fn contact_form() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Admin password checks: 10 per minute.
    pub fn admin_auth() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}
