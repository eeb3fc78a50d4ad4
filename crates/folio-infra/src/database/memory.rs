//! In-memory stores - used when no database is configured.
//!
//! Data is lost on process restart.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{
    Contact, ContactStats, ContactStatus, Post, PostStats, PostStatus, PublicPostFilter, TagCount,
    rank_counts,
};
use folio_core::error::RepoError;
use folio_core::pagination::{Page, PageRequest};
use folio_core::ports::{BaseRepository, ContactRepository, PostRepository};

#[derive(Default)]
pub struct InMemoryContactRepository {
    store: RwLock<HashMap<Uuid, Contact>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Contact, Uuid> for InMemoryContactRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, contact: Contact) -> Result<Contact, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&contact.id) {
            return Err(RepoError::Constraint(format!("duplicate id {}", contact.id)));
        }
        store.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update(&self, contact: Contact) -> Result<Contact, RepoError> {
        let mut store = self.store.write().await;
        let slot = store.get_mut(&contact.id).ok_or(RepoError::NotFound)?;
        *slot = contact.clone();
        Ok(contact)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepoError> {
        let store = self.store.read().await;
        let mut contacts: Vec<Contact> = store
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        contacts.sort_by_key(|c| Reverse(c.created_at));
        Ok(page.slice(contacts))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<Contact>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|contact| {
            contact.status = status;
            contact.updated_at = Utc::now();
            contact.clone()
        }))
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<ContactStats, RepoError> {
        let store = self.store.read().await;
        Ok(ContactStats {
            total: store.len() as u64,
            new: store
                .values()
                .filter(|c| c.status == ContactStatus::New)
                .count() as u64,
            today: store.values().filter(|c| c.created_at >= since).count() as u64,
        })
    }
}

/// Posts keyed by id. Slug uniqueness is enforced on every write.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slug_taken(store: &HashMap<Uuid, Post>, post: &Post) -> bool {
        store
            .values()
            .any(|other| other.slug == post.slug && other.id != post.id)
    }

    async fn published(&self) -> Vec<Post> {
        self.store
            .read()
            .await
            .values()
            .filter(|p| p.is_published())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("duplicate id {}", post.id)));
        }
        if Self::slug_taken(&store, &post) {
            return Err(RepoError::Constraint(format!("duplicate slug {}", post.slug)));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if Self::slug_taken(&store, &post) {
            return Err(RepoError::Constraint(format!("duplicate slug {}", post.slug)));
        }
        // Views are only ever changed by increment_views.
        let views = store.get(&post.id).map_or(post.views, |current| current.views);
        let stored = Post { views, ..post };
        store.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn increment_views(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store
            .values_mut()
            .find(|p| p.slug == slug && p.is_published())
            .map(|post| {
                post.views += 1;
                post.clone()
            }))
    }

    async fn list_published(
        &self,
        filter: &PublicPostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .published()
            .await
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        posts.sort_by_key(|p| Reverse((p.published_at, p.created_at)));
        Ok(page.slice(posts))
    }

    async fn list_all(
        &self,
        status: Option<PostStatus>,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        posts.sort_by_key(|p| Reverse(p.updated_at));
        Ok(page.slice(posts))
    }

    async fn category_counts(&self) -> Result<Vec<TagCount>, RepoError> {
        let mut counts = BTreeMap::new();
        for post in self.published().await {
            *counts.entry(post.category.to_string()).or_insert(0) += 1;
        }
        Ok(rank_counts(counts, None))
    }

    async fn tag_counts(&self, limit: usize) -> Result<Vec<TagCount>, RepoError> {
        let mut counts = BTreeMap::new();
        for post in self.published().await {
            for tag in post.tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        Ok(rank_counts(counts, Some(limit)))
    }

    async fn stats(&self) -> Result<PostStats, RepoError> {
        let store = self.store.read().await;
        let mut by_status: BTreeMap<String, u64> = PostStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for post in store.values() {
            *by_status.entry(post.status.to_string()).or_insert(0) += 1;
        }
        Ok(PostStats {
            by_status,
            total_posts: store.len() as u64,
            total_views: store.values().map(|p| p.views).sum(),
        })
    }
}
