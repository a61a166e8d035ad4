//! Error types with Sentry integration.
//!
//! Service calls return `Result<T, ApiError>`: the backend's own verdict
//! (status, code and message) or a transport failure folded into the same
//! shape. Infrastructure failures outside a request use [`ClientError`].

use nongsan_core::api_code;
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Message when the backend returns an error without one.
pub const SERVER_ERROR: &str = "Server error";
/// Message when no response arrived at all.
pub const NETWORK_ERROR: &str = "Network error - please check your connection";
/// Message for failures that are neither of the above.
pub const UNKNOWN_ERROR: &str = "Unknown error";
/// Shown to users when neither the code nor the server explains a failure.
pub const GENERIC_MESSAGE: &str = "Có lỗi xảy ra, vui lòng thử lại";

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status; `0` when the request never got a response.
    pub status: u16,
    /// Backend result code, e.g. `auth-e-04`.
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    /// An error response from the backend.
    #[must_use]
    pub fn server(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SERVER_ERROR.to_string()),
        }
    }

    /// The request was sent but nothing came back.
    #[must_use]
    pub fn network() -> Self {
        Self {
            status: 0,
            code: None,
            message: NETWORK_ERROR.to_string(),
        }
    }

    /// Any other failure, such as an undecodable body.
    #[must_use]
    pub fn unknown(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            code: None,
            message: if message.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message
            },
        }
    }

    /// Whether the access token was rejected.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    #[must_use]
    pub const fn is_network(&self) -> bool {
        self.status == 0
    }

    /// Failures worth reporting: transport, 5xx and decode errors.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        self.status == 0 || self.status >= 500
    }

    /// The message to show a user.
    ///
    /// Prefers the translation of the backend code, then the backend's own
    /// message, then [`GENERIC_MESSAGE`].
    #[must_use]
    pub fn localized(&self) -> String {
        if let Some(message) = self.code.as_deref().and_then(api_code::lookup) {
            return message.to_string();
        }
        if self.status != 0 && self.message != SERVER_ERROR && !self.message.is_empty() {
            return self.message.clone();
        }
        GENERIC_MESSAGE.to_string()
    }
}

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A persisted store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// HTTP client setup failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend rejected a request.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Capture an unexpected API failure to Sentry and log it.
pub(crate) fn report(error: &ApiError, operation: &str) {
    if error.is_unexpected() {
        let event_id = sentry::capture_error(error);
        tracing::error!(
            error = %error,
            operation,
            sentry_event_id = %event_id,
            "API request failed"
        );
    } else {
        tracing::warn!(
            status = error.status,
            code = error.code.as_deref().unwrap_or_default(),
            operation,
            "API request rejected"
        );
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after the profile is fetched to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for store actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
