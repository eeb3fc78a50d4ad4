//! Health check endpoint.

use actix_web::{HttpResponse, web};
use folio_shared::ApiResponse;
use folio_shared::dto::{ApiIndex, HealthResponse};

use crate::state::AppState;

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.environment.clone(),
    };

    HttpResponse::Ok().json(ApiResponse::ok_with_message(response, "Portfolio API is running"))
}

/// GET /api
pub async fn index() -> HttpResponse {
    let index = ApiIndex {
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            ("health", "GET /api/health"),
            ("contacts", "POST /api/contacts"),
            ("posts", "GET /api/posts"),
            ("post", "GET /api/posts/{slug}"),
            ("categories", "GET /api/posts/categories"),
            ("tags", "GET /api/posts/tags"),
        ]
        .into_iter()
        .collect(),
    };

    HttpResponse::Ok().json(ApiResponse::ok_with_message(index, "Folio portfolio API"))
}
