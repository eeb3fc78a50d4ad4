//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`.
//! This crate contains the stores, rate limiters and the mail relay client.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `rate-limit` - GCRA rate limiting via governor

pub mod database;
pub mod notify;
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryContactRepository, InMemoryPostRepository};
pub use notify::{MailRelayConfig, MailRelayNotifier, NoopNotifier};
pub use rate_limit::{RateLimitConfig, SlidingWindowRateLimiter};

#[cfg(feature = "postgres")]
pub use database::{PostgresContactRepository, PostgresPostRepository};

#[cfg(feature = "rate-limit")]
pub use rate_limit::GcraRateLimiter;
