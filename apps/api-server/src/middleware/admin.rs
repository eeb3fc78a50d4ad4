//! Shared-secret admin gate.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use super::error::AppError;
use crate::state::AppState;

/// Header carrying the admin password.
pub const ADMIN_HEADER: &str = "x-admin-password";

pub const INVALID_PASSWORD: &str = "Unauthorized. Invalid admin password.";
pub const ADMIN_DISABLED: &str = "Admin access is disabled";

/// The configured admin password. An unset or empty password disables
/// admin access entirely instead of letting everyone in.
#[derive(Clone, Default)]
pub struct AdminSecret(Option<Arc<str>>);

impl AdminSecret {
    pub fn new(password: Option<&str>) -> Self {
        Self(password.filter(|p| !p.is_empty()).map(Arc::from))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Check a candidate password.
    pub fn verify(&self, candidate: &str) -> Result<(), AppError> {
        let secret = self.0.as_deref().ok_or(AppError::Forbidden(ADMIN_DISABLED))?;
        if constant_time_eq(secret.as_bytes(), candidate.as_bytes()) {
            Ok(())
        } else {
            Err(AppError::Unauthorized(INVALID_PASSWORD))
        }
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AdminSecret")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor that admits only requests carrying the admin password.
///
/// Put it first in a handler's arguments so the gate runs before the body
/// is parsed:
/// ```ignore
/// async fn stats(_admin: AdminGuard, state: web::Data<AppState>) -> AppResult<HttpResponse>
/// ```
pub struct AdminGuard;

impl FromRequest for AdminGuard {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AppError::Internal("Server configuration error".to_string())));
        };

        let candidate = req
            .headers()
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let result = state.admin.verify(candidate).map(|()| AdminGuard);
        if let Err(e) = &result {
            tracing::warn!(path = %req.path(), error = %e, "Admin gate rejected request");
        }
        ready(result)
    }
}
