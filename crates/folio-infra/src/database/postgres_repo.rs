//! PostgreSQL repository implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use uuid::Uuid;

use folio_core::domain::{
    Contact, ContactStats, ContactStatus, Post, PostStats, PostStatus, PublicPostFilter, TagCount,
    rank_counts,
};
use folio_core::error::RepoError;
use folio_core::pagination::{Page, PageRequest};
use folio_core::ports::{ContactRepository, PostRepository};

use super::entity::contact::{self, Entity as ContactEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL contact repository.
pub type PostgresContactRepository = PostgresBaseRepository<ContactEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Count then fetch one page of `query`.
async fn fetch_page<E, T>(
    db: &sea_orm::DbConn,
    query: Select<E>,
    page: PageRequest,
) -> Result<Page<T>, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    T: TryFrom<E::Model, Error = RepoError>,
{
    let total = query.clone().count(db).await.map_err(db_err)?;
    let items = query
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(items, total, page))
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepoError> {
        let mut query = ContactEntity::find();
        if let Some(status) = status {
            query = query.filter(contact::Column::Status.eq(status.as_str()));
        }
        let query = query.order_by_desc(contact::Column::CreatedAt);
        fetch_page(&self.db, query, page).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<Contact>, RepoError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut updated = ContactEntity::update_many()
            .col_expr(contact::Column::Status, Expr::value(status.as_str()))
            .col_expr(contact::Column::UpdatedAt, Expr::value(now))
            .filter(contact::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(db_err)?;

        updated.pop().map(Contact::try_from).transpose()
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<ContactStats, RepoError> {
        let since: DateTimeWithTimeZone = since.into();

        let total = ContactEntity::find().count(&self.db).await.map_err(db_err)?;
        let new = ContactEntity::find()
            .filter(contact::Column::Status.eq(ContactStatus::New.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let today = ContactEntity::find()
            .filter(contact::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ContactStats { total, new, today })
    }
}

fn published() -> Condition {
    Condition::all().add(post::Column::Status.eq(PostStatus::Published.as_str()))
}

/// Escape LIKE metacharacters so search terms match literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn public_condition(filter: &PublicPostFilter) -> Condition {
    let mut cond = published();
    if let Some(category) = filter.category {
        cond = cond.add(post::Column::Category.eq(category.as_str()));
    }
    if let Some(tag) = &filter.tag {
        cond = cond.add(Expr::cust_with_values("$1 = ANY(\"tags\")", [tag.clone()]));
    }
    if filter.featured_only {
        cond = cond.add(post::Column::Featured.eq(true));
    }

    let terms = filter.search_terms();
    if !terms.is_empty() {
        let mut any = Condition::any();
        for term in &terms {
            let pattern = like_pattern(term);
            any = any
                .add(Expr::col(post::Column::Title).ilike(pattern.as_str()))
                .add(Expr::col(post::Column::Content).ilike(pattern.as_str()));
        }
        cond = cond.add(any);
    }
    cond
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn increment_views(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let mut updated = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Slug.eq(slug))
            .filter(published())
            .exec_with_returning(&self.db)
            .await
            .map_err(db_err)?;

        updated.pop().map(Post::try_from).transpose()
    }

    async fn list_published(
        &self,
        filter: &PublicPostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(public_condition(filter))
            .order_by_desc(post::Column::PublishedAt)
            .order_by_desc(post::Column::CreatedAt);
        fetch_page(&self.db, query, page).await
    }

    async fn list_all(
        &self,
        status: Option<PostStatus>,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut query = PostEntity::find();
        if let Some(status) = status {
            query = query.filter(post::Column::Status.eq(status.as_str()));
        }
        let query = query.order_by_desc(post::Column::UpdatedAt);
        fetch_page(&self.db, query, page).await
    }

    async fn category_counts(&self) -> Result<Vec<TagCount>, RepoError> {
        let rows: Vec<(String, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .filter(published())
            .group_by(post::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let counts = rows
            .into_iter()
            .map(|(name, n)| (name, count(n)))
            .collect::<BTreeMap<_, _>>();
        Ok(rank_counts(counts, None))
    }

    async fn tag_counts(&self, limit: usize) -> Result<Vec<TagCount>, RepoError> {
        let rows: Vec<Vec<String>> = PostEntity::find()
            .select_only()
            .column(post::Column::Tags)
            .filter(published())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut counts = BTreeMap::new();
        for tag in rows.into_iter().flatten() {
            *counts.entry(tag).or_insert(0) += 1;
        }
        Ok(rank_counts(counts, Some(limit)))
    }

    async fn stats(&self) -> Result<PostStats, RepoError> {
        let rows: Vec<(String, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Status)
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .group_by(post::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let total_views: Option<i64> = PostEntity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(\"views\"), 0)::BIGINT"), "total_views")
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let mut by_status: BTreeMap<String, u64> = PostStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        let mut total_posts = 0;
        for (status, n) in rows {
            total_posts += count(n);
            by_status.insert(status, count(n));
        }

        Ok(PostStats {
            by_status,
            total_posts,
            total_views: total_views.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    }
}
