//! Error handling - every failure leaves as the standard JSON envelope.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError};

use folio_core::{DomainError, FieldError};
use folio_shared::ApiResponse;

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Include internal error detail in 500 responses. Set once at startup.
pub fn expose_internal_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

/// Seconds rounded up, at least 1.
pub fn whole_seconds(wait: Duration) -> u64 {
    (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
}

/// Application-level error type that converts to envelope responses.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    PayloadTooLarge,
    RateLimited {
        message: String,
        retry_after: Duration,
    },
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {} field(s)", errors.len()),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::PayloadTooLarge => write!(f, "Payload too large"),
            AppError::RateLimited { message, .. } => write!(f, "Rate limited: {}", message),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        let body = match self {
            AppError::Validation(errors) => ApiResponse::validation(errors.clone()),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => ApiResponse::error(msg.clone()),
            AppError::Unauthorized(msg) | AppError::Forbidden(msg) => ApiResponse::error(*msg),
            AppError::PayloadTooLarge => ApiResponse::error("Request body too large"),
            AppError::RateLimited {
                message,
                retry_after,
            } => {
                builder.insert_header((header::RETRY_AFTER, whole_seconds(*retry_after).to_string()));
                ApiResponse::error(message.clone())
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                if details_exposed() {
                    ApiResponse::error(format!("Internal server error: {detail}"))
                } else {
                    ApiResponse::error("Internal server error")
                }
            }
        };

        builder.json(body)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation(errors) => AppError::Validation(errors.into_errors()),
            DomainError::Unauthorized => AppError::Unauthorized(super::admin::INVALID_PASSWORD),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Malformed or oversized JSON bodies.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::PayloadTooLarge.into()
        }
        JsonPayloadError::ContentType => {
            AppError::BadRequest("Content-Type must be application/json".to_string()).into()
        }
        _ => AppError::BadRequest("Invalid JSON body".to_string()).into(),
    }
}

/// Query strings that do not deserialize, e.g. `?page=abc`.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query parameters: {err}")).into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
