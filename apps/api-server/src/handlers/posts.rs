//! Blog post endpoints, public and admin.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use folio_core::pagination::PageRequest;
use folio_shared::ApiResponse;
use folio_shared::dto::{AuthRequest, ListQuery, PostListQuery};

use super::{ADMIN_PAGE_SIZE, PUBLIC_PAGE_SIZE, parse_id};
use crate::middleware::admin::AdminGuard;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ENTITY: &str = "Post";

/// GET /api/posts
pub async fn list_public(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.page, query.limit, PUBLIC_PAGE_SIZE);
    let posts = state.posts.list_public(query.filters(), page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(posts)))
}

/// GET /api/posts/categories
pub async fn categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.posts.categories().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/posts/tags
pub async fn tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.posts.tags().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

/// GET /api/posts/{slug}
pub async fn get_public(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_public(&slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/posts/admin/all
pub async fn list_admin(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.page, query.limit, ADMIN_PAGE_SIZE);
    let posts = state.posts.list_admin(query.status.as_deref(), page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(posts)))
}

/// GET /api/posts/admin/stats
pub async fn stats(_admin: AdminGuard, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.posts.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/posts/admin/{id}
pub async fn get_admin(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    let post = state.posts.get_admin(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/admin
pub async fn create(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create(&body).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(post, "Post created successfully")))
}

/// PUT /api/posts/admin/{id}
pub async fn update(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    let post = state.posts.update(id, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(post, "Post updated successfully")))
}

/// DELETE /api/posts/admin/{id}
pub async fn delete(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    state.posts.delete(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// POST /api/posts/admin/auth
///
/// Lets the admin UI check a password before storing it. Not gated itself,
/// but throttled per client.
pub async fn authenticate(
    state: web::Data<AppState>,
    body: web::Json<AuthRequest>,
) -> AppResult<HttpResponse> {
    let candidate = body.password.as_deref().unwrap_or_default();
    match state.admin.verify(candidate) {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Authentication successful"))),
        Err(AppError::Unauthorized(_)) => {
            tracing::warn!("Admin authentication failed");
            Err(AppError::Unauthorized("Invalid password"))
        }
        Err(e) => Err(e),
    }
}
