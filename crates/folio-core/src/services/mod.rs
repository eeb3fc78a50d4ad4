//! Services - the contact and post stores, built on the ports.

mod contact;
mod post;

pub use contact::{ContactService, start_of_local_day};
pub use post::{MAX_SLUG_ATTEMPTS, PostService, PublicPostQuery, TAG_LIMIT};
