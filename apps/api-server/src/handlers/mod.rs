//! HTTP handlers and route configuration.

mod contacts;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, guard, web};
use uuid::Uuid;

use folio_shared::ApiResponse;

use crate::middleware::error::{AppError, json_error_handler, query_error_handler};
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::middleware::security;
use crate::state::AppState;

/// Default page size of the public post list.
pub const PUBLIC_PAGE_SIZE: u64 = 10;
/// Default page size of admin lists.
pub const ADMIN_PAGE_SIZE: u64 = 20;
/// Largest JSON body on routes without their own limit.
pub const JSON_LIMIT: usize = 10 * 1024;
/// Contact submissions: a 5000-character message of 4-byte characters fits.
pub const CONTACT_JSON_LIMIT: usize = 32 * 1024;
/// Post create and update bodies.
pub const POST_JSON_LIMIT: usize = 1024 * 1024;

/// Identifiers that are not UUIDs cannot name any record.
fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{entity} not found")))
}

/// Fallback for every unmatched route.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error(format!("Route {} not found", req.uri())))
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error_handler)
}

/// Register shared state, extractor settings and all routes.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .app_data(json_config(JSON_LIMIT))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    configure_routes(cfg, state);
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("", web::get().to(health::index))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/contacts")
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .app_data(json_config(CONTACT_JSON_LIMIT))
                            .wrap(
                                RateLimitMiddleware::new(
                                    state.contact_limiter.clone(),
                                    "Too many submissions",
                                )
                                .trust_proxy(state.trust_proxy),
                            )
                            .route(web::post().to(contacts::submit)),
                    )
                    // Admin routes
                    .service(web::resource("").route(web::get().to(contacts::list)))
                    .route("/stats", web::get().to(contacts::stats))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(contacts::get))
                            .route(web::patch().to(contacts::update_status))
                            .route(web::delete().to(contacts::delete)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_public))
                    .route("/categories", web::get().to(posts::categories))
                    .route("/tags", web::get().to(posts::tags))
                    .service(
                        web::resource("/admin/auth")
                            .wrap(
                                RateLimitMiddleware::new(
                                    state.auth_limiter.clone(),
                                    "Too many authentication attempts",
                                )
                                .trust_proxy(state.trust_proxy),
                            )
                            .route(web::post().to(posts::authenticate)),
                    )
                    // Admin routes, registered before the slug catch-all
                    .route("/admin/all", web::get().to(posts::list_admin))
                    .route("/admin/stats", web::get().to(posts::stats))
                    .service(
                        web::resource("/admin")
                            .app_data(json_config(POST_JSON_LIMIT))
                            .route(web::post().to(posts::create)),
                    )
                    .service(
                        web::resource("/admin/{id}")
                            .app_data(json_config(POST_JSON_LIMIT))
                            .route(web::get().to(posts::get_admin))
                            .route(web::put().to(posts::update))
                            .route(web::delete().to(posts::delete)),
                    )
                    .route("/{slug}", web::get().to(posts::get_public)),
            )
            // Registered last so they run first: CORS answers preflights
            // before routing, and every response gets the hardening headers.
            .wrap(security::cors(&state.allowed_origins))
            .wrap(security::security_headers()),
    );
}
