//! Data Transfer Objects - request/response types for the API.

use std::collections::BTreeMap;

use folio_core::services::PublicPostQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `?page&limit&status` on admin lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

/// `?page&limit&category&tag&search&featured` on the public post list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
}

impl PostListQuery {
    pub fn filters(&self) -> PublicPostQuery {
        PublicPostQuery {
            category: self.category.clone(),
            tag: self.tag.clone(),
            search: self.search.clone(),
            featured: self.featured.clone(),
        }
    }
}

/// Body of `PATCH /api/contacts/{id}`. The status is validated by the
/// service, so any JSON value is accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<Value>,
}

/// Body of `POST /api/posts/admin/auth`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Payload of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub environment: String,
}

/// Payload of `GET /api`: a short map of the public surface.
#[derive(Debug, Clone, Serialize)]
pub struct ApiIndex {
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
