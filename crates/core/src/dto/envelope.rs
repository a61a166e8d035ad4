//! Response envelope and pagination wrappers.

use serde::{Deserialize, Serialize};

/// The envelope every backend endpoint wraps its payload in.
///
/// `code` is a result code such as `auth-s-03` or `address-e-01` that
/// [`crate::api_code`] maps to a user-facing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Acknowledgement of a call whose payload the caller does not need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    pub code: Option<String>,
    pub message: Option<String>,
    /// HTTP status of the response.
    pub status: u16,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl<T> PageResponse<T> {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

/// Page request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data() {
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"code":"auth-s-01","message":"ok"}"#).unwrap();
        assert_eq!(envelope.code.as_deref(), Some("auth-s-01"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_page_has_next() {
        let page: PageResponse<u32> = serde_json::from_str(
            r#"{"content":[1,2],"page":0,"totalPages":2,"totalElements":4}"#,
        )
        .unwrap();
        assert!(page.has_next());

        let last = PageResponse::<u32> {
            content: vec![],
            page: 1,
            total_pages: 2,
            total_elements: 4,
        };
        assert!(!last.has_next());
    }
}
