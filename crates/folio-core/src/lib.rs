//! # Folio Core
//!
//! The domain layer of the Folio portfolio backend: contact submissions and
//! blog posts, their validation rules, derived fields and stores.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod derived;
pub mod domain;
pub mod error;
pub mod notification;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, FieldError, RepoError, ValidationErrors};
