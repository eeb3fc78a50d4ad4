//! The JSON envelope every endpoint answers with.

use folio_core::FieldError;
use folio_core::pagination::Page;
use serde::Serialize;

/// `{success, message?, data?, errors?, pagination?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Paging metadata of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
    pub limit: u64,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            current: page.request.page,
            pages: page.pages(),
            total: page.total,
            limit: page.request.limit,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
            pagination: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// One page of items plus its pagination block.
    pub fn page(page: Page<T>) -> ApiResponse<Vec<T>> {
        let pagination = Pagination::from(&page);
        ApiResponse {
            pagination: Some(pagination),
            ..ApiResponse::ok(page.items)
        }
    }
}

impl ApiResponse<()> {
    /// Success with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            errors: None,
            pagination: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::error("Validation failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_core::pagination::PageRequest;
    use serde_json::json;

    use super::*;

    #[test]
    fn page_envelope_carries_pagination() {
        let request = PageRequest::new(Some(2), Some(2), 10);
        let page = Page::new(vec!["c", "d"], 5, request);

        let body = serde_json::to_value(ApiResponse::<&str>::page(page)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": ["c", "d"],
                "pagination": { "current": 2, "pages": 3, "total": 5, "limit": 2 }
            })
        );
    }

    #[test]
    fn validation_envelope_lists_fields() {
        let body = serde_json::to_value(ApiResponse::validation(vec![FieldError::new(
            "email",
            "Please provide a valid email",
        )]))
        .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "email");
        assert!(body.get("data").is_none());
    }
}
