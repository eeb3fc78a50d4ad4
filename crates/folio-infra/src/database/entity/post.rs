//! Post entity for SeaORM.

use sea_orm::{NotSet, Set};
use sea_orm::entity::prelude::*;

use folio_core::domain::Post;
use folio_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub cover_image: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub status: String,
    pub featured: bool,
    pub views: i64,
    pub read_time: i32,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            RepoError::Corrupt(format!("post {id} {field}: {e}"))
        };
        let status = model.status.parse().map_err(|e| corrupt("status", &e))?;
        let category = model.category.parse().map_err(|e| corrupt("category", &e))?;
        let read_time = u32::try_from(model.read_time).map_err(|e| corrupt("read_time", &e))?;

        Ok(Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            content: model.content,
            cover_image: model.cover_image,
            category,
            tags: model.tags,
            author: model.author,
            status,
            featured: model.featured,
            views: model.views,
            read_time,
            published_at: model.published_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            excerpt: Set(post.excerpt),
            content: Set(post.content),
            cover_image: Set(post.cover_image),
            category: Set(post.category.to_string()),
            tags: Set(post.tags),
            author: Set(post.author),
            status: Set(post.status.to_string()),
            featured: Set(post.featured),
            // Written only by the atomic view increment; new rows take the column default.
            views: NotSet,
            read_time: Set(i32::try_from(post.read_time).unwrap_or(i32::MAX)),
            published_at: Set(post.published_at.map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
