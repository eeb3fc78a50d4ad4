//! Domain entities - the core business objects.

mod contact;
mod post;

pub use contact::{
    ClientOrigin, Contact, ContactListing, ContactReceipt, ContactStats, ContactStatus,
    NewContact, UnknownVariant,
};
pub use post::{
    Category, DEFAULT_AUTHOR, Post, PostDraft, PostStats, PostStatus, PostSummary,
    PublicPostFilter, TagCount, rank_counts,
};
