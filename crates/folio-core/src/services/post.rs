//! Post store: blog post lifecycle, derived fields and public views.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::derived::{SlugTokens, slugify};
use crate::domain::{
    Category, DEFAULT_AUTHOR, Post, PostStats, PostStatus, PostSummary, PublicPostFilter, TagCount,
};
use crate::error::{DomainError, RepoError};
use crate::pagination::{Page, PageRequest};
use crate::ports::PostRepository;
use crate::validation::{parse_status_filter, validate_post};

const ENTITY: &str = "Post";

/// Slug collisions are retried with a fresh token this many times in total.
pub const MAX_SLUG_ATTEMPTS: usize = 3;

/// Most tags returned by [`PostService::tags`].
pub const TAG_LIMIT: usize = 20;

/// Raw public listing filters, as they arrive in a query string.
#[derive(Debug, Clone, Default)]
pub struct PublicPostQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Clone, Copy)]
enum WriteMode {
    Insert,
    Update,
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    author: String,
    tokens: SlugTokens,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self::with_author(repo, DEFAULT_AUTHOR)
    }

    pub fn with_author(repo: Arc<dyn PostRepository>, author: impl Into<String>) -> Self {
        Self {
            repo,
            author: author.into(),
            tokens: SlugTokens::new(),
        }
    }

    fn fresh_slug(&self, title: &str) -> String {
        slugify(title, &self.tokens.next(Utc::now()))
    }

    /// Persist `post`, assigning a new slug and retrying when the store
    /// reports a uniqueness conflict.
    async fn persist(
        &self,
        mut post: Post,
        mode: WriteMode,
        retry_slug: bool,
    ) -> Result<Post, DomainError> {
        let mut attempt = 1;
        loop {
            let result = match mode {
                WriteMode::Insert => self.repo.insert(post.clone()).await,
                WriteMode::Update => self.repo.update(post.clone()).await,
            };
            match result {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Constraint(detail)) if retry_slug && attempt < MAX_SLUG_ATTEMPTS => {
                    tracing::warn!(slug = %post.slug, %detail, attempt, "Slug collision, retrying");
                    post.slug = self.fresh_slug(&post.title);
                    attempt += 1;
                }
                Err(RepoError::NotFound) => return Err(DomainError::not_found(ENTITY, post.id)),
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn create(&self, payload: &Value) -> Result<Post, DomainError> {
        let draft = validate_post(payload)?;
        let slug = self.fresh_slug(&draft.title);
        let post = Post::create(draft, &self.author, slug, Utc::now());

        let post = self.persist(post, WriteMode::Insert, true).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, status = %post.status, "Post created");
        Ok(post)
    }

    pub async fn update(&self, id: Uuid, payload: &Value) -> Result<Post, DomainError> {
        let draft = validate_post(payload)?;
        let mut post = self.get_admin(id).await?;

        let title_changed = post.apply_update(draft, Utc::now());
        if title_changed {
            post.slug = self.fresh_slug(&post.title);
        }

        let post = self.persist(post, WriteMode::Update, title_changed).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, status = %post.status, "Post updated");
        Ok(post)
    }

    /// Public single-post view. Counts one view per call; drafts and
    /// archived posts are reported exactly like missing ones.
    pub async fn get_public(&self, slug: &str) -> Result<Post, DomainError> {
        self.repo
            .increment_views(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, slug))
    }

    /// Admin single-post view; any status, no view counted.
    pub async fn get_admin(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    pub async fn list_public(
        &self,
        query: PublicPostQuery,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, DomainError> {
        let category = match non_blank(query.category) {
            None => None,
            Some(raw) => match raw.parse::<Category>() {
                Ok(category) => Some(category),
                // No post can be in an unknown category.
                Err(_) => return Ok(Page::new(Vec::new(), 0, page)),
            },
        };

        let filter = PublicPostFilter {
            category,
            tag: non_blank(query.tag).map(|t| t.to_lowercase()),
            search: non_blank(query.search),
            featured_only: query.featured.as_deref() == Some("true"),
        };

        let posts = self.repo.list_published(&filter, page).await?;
        Ok(posts.map(|post| post.summary()))
    }

    pub async fn list_admin(
        &self,
        status: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let status = parse_status_filter::<PostStatus>(status)?;
        Ok(self.repo.list_all(status, page).await?)
    }

    pub async fn categories(&self) -> Result<Vec<TagCount>, DomainError> {
        Ok(self.repo.category_counts().await?)
    }

    pub async fn tags(&self) -> Result<Vec<TagCount>, DomainError> {
        Ok(self.repo.tag_counts(TAG_LIMIT).await?)
    }

    pub async fn stats(&self) -> Result<PostStats, DomainError> {
        Ok(self.repo.stats().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.repo.delete(id).await {
            Ok(()) => {
                tracing::info!(post_id = %id, "Post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found(ENTITY, id)),
            Err(e) => Err(e.into()),
        }
    }
}
