//! Cross-origin policy and response hardening headers.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;

use super::admin::ADMIN_HEADER;

/// Preflight results may be cached this long (seconds).
const PREFLIGHT_MAX_AGE: usize = 3600;

/// CORS for the browser frontend. Requests without an `Origin` header
/// (curl, server-to-server) are not affected.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    cors.allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
    .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .allowed_header(ADMIN_HEADER)
    .supports_credentials()
    .max_age(PREFLIGHT_MAX_AGE)
}

/// Hardening headers for a JSON API that is never framed or sniffed.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Origin-Agent-Cluster", "?1"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Strict-Transport-Security", "max-age=15552000; includeSubDomains"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("X-Download-Options", "noopen"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
        .add(("X-XSS-Protection", "0"))
}
