//! # Folio Shared
//!
//! Wire types for the HTTP API: the response envelope and request DTOs.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, Pagination};
