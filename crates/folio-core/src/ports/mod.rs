//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod notifier;
mod rate_limit;
mod repository;

pub use notifier::{Notifier, NotifyError};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, ContactRepository, PostRepository};
