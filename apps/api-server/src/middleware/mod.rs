//! Middleware modules.

pub mod admin;
pub mod client;
pub mod error;
pub mod rate_limit;
pub mod security;
