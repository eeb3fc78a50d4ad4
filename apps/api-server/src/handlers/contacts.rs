//! Contact form endpoints.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde_json::Value;

use folio_core::domain::ClientOrigin;
use folio_core::pagination::PageRequest;
use folio_shared::ApiResponse;
use folio_shared::dto::{ListQuery, StatusUpdate};

use super::{ADMIN_PAGE_SIZE, parse_id};
use crate::middleware::admin::AdminGuard;
use crate::middleware::client::client_address;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const ENTITY: &str = "Contact";

fn origin(req: &HttpRequest, trust_proxy: bool) -> ClientOrigin {
    ClientOrigin {
        ip_address: client_address(req, trust_proxy),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

/// POST /api/contacts
pub async fn submit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let contact = state.contacts.submit(&body, origin(&req, state.trust_proxy)).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        contact.receipt(),
        "Thank you for your message! I'll get back to you soon.",
    )))
}

/// GET /api/contacts
pub async fn list(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.page, query.limit, ADMIN_PAGE_SIZE);
    let contacts = state.contacts.list(query.status.as_deref(), page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::page(contacts.map(|c| c.listing()))))
}

/// GET /api/contacts/stats
pub async fn stats(_admin: AdminGuard, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.contacts.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/contacts/{id}
pub async fn get(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    let contact = state.contacts.get(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(contact)))
}

/// PATCH /api/contacts/{id}
pub async fn update_status(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusUpdate>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    let contact = state.contacts.update_status(id, body.status.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(contact, "Contact updated")))
}

/// DELETE /api/contacts/{id}
pub async fn delete(
    _admin: AdminGuard,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, ENTITY)?;
    state.contacts.delete(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Contact deleted")))
}
