use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contact::UnknownVariant;
use crate::derived::{derive_excerpt, read_time};

/// Author credited when none is configured.
pub const DEFAULT_AUTHOR: &str = "Thanh Dat Tran";

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [Self::Draft, Self::Published, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Fixed set of blog categories. Names are matched exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Programming,
    Career,
    Projects,
    Life,
    Tutorial,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Technology,
        Self::Programming,
        Self::Career,
        Self::Projects,
        Self::Life,
        Self::Tutorial,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Programming => "Programming",
            Self::Career => "Career",
            Self::Projects => "Projects",
            Self::Life => "Life",
            Self::Tutorial => "Tutorial",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// A validated post submission, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<Category>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub featured: Option<bool>,
}

/// Post entity - a blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub author: String,
    pub status: PostStatus,
    pub featured: bool,
    pub views: i64,
    pub read_time: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a new post from a validated draft.
    ///
    /// The slug is supplied by the caller because uniqueness is a store
    /// concern; every other derived field is computed here.
    pub fn create(draft: PostDraft, author: &str, slug: String, now: DateTime<Utc>) -> Self {
        let status = draft.status.unwrap_or_default();
        let excerpt = match draft.excerpt {
            Some(excerpt) => excerpt,
            None => derive_excerpt(&draft.content),
        };

        Self {
            id: Uuid::new_v4(),
            read_time: read_time(&draft.content),
            title: draft.title,
            slug,
            excerpt,
            content: draft.content,
            cover_image: draft.cover_image.unwrap_or_default(),
            category: draft.category.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            author: author.to_string(),
            status,
            featured: draft.featured.unwrap_or(false),
            views: 0,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an admin edit and recompute derived fields whose source changed.
    ///
    /// Returns `true` when the title changed, in which case the caller must
    /// assign a fresh slug.
    pub fn apply_update(&mut self, draft: PostDraft, now: DateTime<Utc>) -> bool {
        let title_changed = self.title != draft.title;
        let content_changed = self.content != draft.content;

        self.title = draft.title;
        self.content = draft.content;
        if let Some(excerpt) = draft.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(category) = draft.category {
            self.category = category;
        }
        if let Some(tags) = draft.tags {
            self.tags = tags;
        }
        if let Some(status) = draft.status {
            self.status = status;
        }
        if let Some(cover_image) = draft.cover_image {
            self.cover_image = cover_image;
        }
        if let Some(featured) = draft.featured {
            self.featured = featured;
        }

        if content_changed {
            self.read_time = read_time(&self.content);
        }
        if self.excerpt.is_empty() && !self.content.is_empty() {
            self.excerpt = derive_excerpt(&self.content);
        }
        if self.status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.updated_at = now;

        title_changed
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// List view without the body.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            cover_image: self.cover_image.clone(),
            category: self.category,
            tags: self.tags.clone(),
            author: self.author.clone(),
            status: self.status,
            featured: self.featured,
            views: self.views,
            read_time: self.read_time,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub author: String,
    pub status: PostStatus,
    pub featured: bool,
    pub views: i64,
    pub read_time: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for the public post listing. Only published posts are ever listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicPostFilter {
    pub category: Option<Category>,
    /// Already lowercased.
    pub tag: Option<String>,
    /// Whitespace-separated terms; a post matches if any term occurs.
    pub search: Option<String>,
    pub featured_only: bool,
}

impl PublicPostFilter {
    /// Search terms, lowercased.
    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }

    /// In-process evaluation of the filter, used by the memory store.
    pub fn matches(&self, post: &Post) -> bool {
        if !post.is_published() {
            return false;
        }
        if self.category.is_some_and(|c| c != post.category) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if self.featured_only && !post.featured {
            return false;
        }
        let terms = self.search_terms();
        if !terms.is_empty() {
            let title = post.title.to_lowercase();
            let content = post.content.to_lowercase();
            return terms
                .iter()
                .any(|term| title.contains(term.as_str()) || content.contains(term.as_str()));
        }
        true
    }
}

/// A distinct category or tag with the number of published posts using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: u64,
}

/// Sort by count descending, then name, and keep at most `limit` entries.
pub fn rank_counts(counts: BTreeMap<String, u64>, limit: Option<usize>) -> Vec<TagCount> {
    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();
    // BTreeMap iteration is name-ordered and the sort is stable.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub by_status: BTreeMap<String, u64>,
    pub total_posts: u64,
    pub total_views: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn body(words: usize) -> String {
        vec!["word"; words].join(" ")
    }

    #[test]
    fn create_applies_defaults() {
        let now = Utc::now();
        let post = Post::create(draft("Hello World", &body(60)), DEFAULT_AUTHOR, "s".into(), now);

        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.category, Category::Other);
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.views, 0);
        assert_eq!(post.read_time, 1);
        assert!(post.published_at.is_none());
        assert!(post.excerpt.ends_with("..."));
    }

    #[test]
    fn create_published_sets_published_at() {
        let now = Utc::now();
        let mut input = draft("Hello World", &body(60));
        input.status = Some(PostStatus::Published);

        let post = Post::create(input, DEFAULT_AUTHOR, "s".into(), now);
        assert_eq!(post.published_at, Some(now));
    }

    #[test]
    fn update_sets_published_at_once() {
        let created = Utc::now();
        let mut post = Post::create(draft("Hello World", &body(60)), DEFAULT_AUTHOR, "s".into(), created);

        let first = created + chrono::Duration::seconds(10);
        let mut publish = draft("Hello World", &body(60));
        publish.status = Some(PostStatus::Published);
        post.apply_update(publish.clone(), first);
        assert_eq!(post.published_at, Some(first));

        let mut archive = draft("Hello World", &body(60));
        archive.status = Some(PostStatus::Archived);
        post.apply_update(archive, first + chrono::Duration::seconds(10));
        post.apply_update(publish, first + chrono::Duration::seconds(20));
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn update_recomputes_read_time_only_on_content_change() {
        let now = Utc::now();
        let mut post = Post::create(draft("Hello World", &body(60)), DEFAULT_AUTHOR, "s".into(), now);
        post.read_time = 42;

        assert!(!post.apply_update(draft("Hello World", &body(60)), now));
        assert_eq!(post.read_time, 42);

        post.apply_update(draft("Hello World", &body(401)), now);
        assert_eq!(post.read_time, 3);
    }

    #[test]
    fn update_keeps_optional_fields_when_absent() {
        let now = Utc::now();
        let mut input = draft("Hello World", &body(60));
        input.category = Some(Category::Life);
        input.tags = Some(vec!["rust".into()]);
        input.excerpt = Some("Custom".into());
        input.featured = Some(true);
        let mut post = Post::create(input, DEFAULT_AUTHOR, "s".into(), now);

        let title_changed = post.apply_update(draft("Another Title", &body(70)), now);

        assert!(title_changed);
        assert_eq!(post.category, Category::Life);
        assert_eq!(post.tags, vec!["rust".to_string()]);
        assert_eq!(post.excerpt, "Custom");
        assert!(post.featured);
    }

    #[test]
    fn category_names_are_exact() {
        assert_eq!("Programming".parse::<Category>(), Ok(Category::Programming));
        assert!("programming".parse::<Category>().is_err());
    }

    #[test]
    fn public_filter_search_is_case_insensitive_any_term() {
        let now = Utc::now();
        let mut input = draft("Learning Rust", &format!("Ownership and borrowing {}", body(50)));
        input.status = Some(PostStatus::Published);
        let post = Post::create(input, DEFAULT_AUTHOR, "s".into(), now);

        let filter = |search: &str| PublicPostFilter {
            search: Some(search.to_string()),
            ..Default::default()
        };
        assert!(filter("rust").matches(&post));
        assert!(filter("golang BORROWING").matches(&post));
        assert!(!filter("golang").matches(&post));
    }

    #[test]
    fn rank_counts_orders_by_count_then_name() {
        let counts = BTreeMap::from([
            ("b".to_string(), 2),
            ("a".to_string(), 2),
            ("c".to_string(), 5),
            ("d".to_string(), 1),
        ]);
        let ranked = rank_counts(counts, Some(3));
        let names: Vec<&str> = ranked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
