use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Contact, ContactStats, ContactStatus, Post, PostStats, PostStatus, PublicPostFilter, TagCount,
};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Contact repository.
#[async_trait]
pub trait ContactRepository: BaseRepository<Contact, Uuid> {
    /// Newest first.
    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepoError>;

    /// Set the status in a single write and return the updated record.
    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<Contact>, RepoError>;

    /// Counters; `today` counts records created at or after `since`.
    async fn stats(&self, since: DateTime<Utc>) -> Result<ContactStats, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Atomically add one view to the published post with this slug and
    /// return it. Unpublished or missing posts yield `None` and are not
    /// touched.
    async fn increment_views(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Published posts matching `filter`, newest publication first.
    async fn list_published(
        &self,
        filter: &PublicPostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Every post, optionally of one status, most recently updated first.
    async fn list_all(
        &self,
        status: Option<PostStatus>,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Categories in use by published posts, ranked.
    async fn category_counts(&self) -> Result<Vec<TagCount>, RepoError>;

    /// Tags in use by published posts, ranked, at most `limit`.
    async fn tag_counts(&self, limit: usize) -> Result<Vec<TagCount>, RepoError>;

    async fn stats(&self) -> Result<PostStats, RepoError>;
}
