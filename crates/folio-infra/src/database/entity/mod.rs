//! SeaORM entities and their mapping to domain records.

pub mod contact;
pub mod post;
