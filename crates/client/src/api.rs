//! HTTP plumbing shared by every service.
//!
//! Every request carries an `x-request-id` and, while the auth store is
//! logged in, `Authorization: Bearer <access token>`. A 401 or 403 response
//! clears the stored tokens. Responses arrive wrapped in
//! `{ code, message, data }`; [`Request::data`] unwraps `data` and
//! [`Request::ack`] keeps the code and message alongside the HTTP status.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use nongsan_core::dto::{ApiAck, ApiEnvelope};
use reqwest::{Method, StatusCode, multipart::Form};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{self, ApiError, ClientError};
use crate::stores::AuthStore;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Prefix of resource routes.
const API_PREFIX: &str = "/api";
/// Prefix of authentication routes.
const AUTH_PREFIX: &str = "/auth";

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST backend.
///
/// Cheap to clone. Public catalog reads made through
/// [`Request::cached_data`] are kept for 5 minutes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    auth: AuthStore,
    cache: Cache<String, Value>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, auth: AuthStore) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("nongsan-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.server_url.clone(),
                auth,
                cache,
            }),
        })
    }

    /// The auth store consulted for bearer tokens.
    #[must_use]
    pub fn auth_store(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// URL of a resource route, e.g. `api_url("/products")`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> Url {
        self.join(API_PREFIX, path)
    }

    /// URL of an authentication route, e.g. `auth_url("/login")`.
    #[must_use]
    pub fn auth_url(&self, path: &str) -> Url {
        self.join(AUTH_PREFIX, path)
    }

    fn join(&self, prefix: &str, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{prefix}{path}"));
        url.set_query(None);
        url
    }

    /// Start a request.
    #[must_use]
    pub const fn request(&self, method: Method, url: Url) -> Request<'_> {
        Request {
            api: self,
            method,
            url,
            body: Body::Empty,
        }
    }

    #[must_use]
    pub const fn get(&self, url: Url) -> Request<'_> {
        self.request(Method::GET, url)
    }

    #[must_use]
    pub const fn post(&self, url: Url) -> Request<'_> {
        self.request(Method::POST, url)
    }

    #[must_use]
    pub const fn put(&self, url: Url) -> Request<'_> {
        self.request(Method::PUT, url)
    }

    #[must_use]
    pub const fn patch(&self, url: Url) -> Request<'_> {
        self.request(Method::PATCH, url)
    }

    #[must_use]
    pub const fn delete(&self, url: Url) -> Request<'_> {
        self.request(Method::DELETE, url)
    }

    /// Drop every cached catalog response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────────

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Body,
    ) -> Result<(StatusCode, ApiEnvelope<Value>), ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(token) = self.inner.auth.bearer().await {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
            Body::Invalid(message) => return Err(ApiError::unknown(500, message)),
        };

        debug!(%method, path = url.path(), request_id = %request_id, "Sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::unknown(500, e.to_string())
            } else {
                debug!(error = %e, request_id = %request_id, "Request failed in transport");
                ApiError::network()
            }
        })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = status.as_u16(), path = url.path(), "Access denied, clearing tokens");
            self.inner.auth.clear_tokens().await;
        }

        let text = response.text().await.map_err(|_| ApiError::network())?;
        let envelope = if text.trim().is_empty() {
            Ok(ApiEnvelope {
                code: None,
                message: None,
                data: None,
            })
        } else {
            serde_json::from_str::<ApiEnvelope<Value>>(&text)
        };

        if !status.is_success() {
            let (code, message) = envelope.map_or((None, None), |env| (env.code, env.message));
            return Err(ApiError::server(status.as_u16(), code, message));
        }

        envelope.map(|env| (status, env)).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::unknown(status.as_u16(), format!("Invalid response body: {e}"))
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Request
// =============================================================================

enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
    /// The body failed to serialize; reported when the request is sent.
    Invalid(String),
}

/// A request being built against the backend.
#[must_use = "a request does nothing until `data` or `ack` is awaited"]
pub struct Request<'a> {
    api: &'a ApiClient,
    method: Method,
    url: Url,
    body: Body,
}

impl Request<'_> {
    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.url.query_pairs_mut().append_pair(key, &value.to_string());
        self
    }

    /// Send `body` as JSON.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = match serde_json::to_value(body) {
            Ok(value) => Body::Json(value),
            Err(e) => Body::Invalid(e.to_string()),
        };
        self
    }

    /// Send a multipart form.
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Send and decode the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, a network error, or an unknown error if
    /// `data` does not decode as `T`.
    pub async fn data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let operation = format!("{} {}", self.method, self.url.path());
        let result = self
            .api
            .execute(self.method, self.url, self.body)
            .await
            .and_then(|(status, envelope)| decode(status, envelope.data));
        if let Err(e) = &result {
            error::report(e, &operation);
        }
        result
    }

    /// Send and keep the envelope's code and message with the status.
    ///
    /// # Errors
    ///
    /// Returns the backend's error or a network error.
    pub async fn ack(self) -> Result<ApiAck, ApiError> {
        let operation = format!("{} {}", self.method, self.url.path());
        let result = self
            .api
            .execute(self.method, self.url, self.body)
            .await
            .map(|(status, envelope)| ApiAck {
                code: envelope.code,
                message: envelope.message,
                status: status.as_u16(),
            });
        if let Err(e) = &result {
            error::report(e, &operation);
        }
        result
    }

    /// Like [`Request::data`], but served from the 5-minute cache when the
    /// same URL was fetched recently. Only successful responses are cached.
    ///
    /// # Errors
    ///
    /// Same as [`Request::data`].
    pub async fn cached_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let key = format!("{} {}", self.method, self.url);
        let cache = self.api.inner.cache.clone();

        if let Some(value) = cache.get(&key).await {
            debug!(key = %key, "Cache hit");
            return decode(StatusCode::OK, Some(value));
        }

        let value: Value = self.data().await?;
        cache.insert(key, value.clone()).await;
        decode(StatusCode::OK, Some(value))
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, data: Option<Value>) -> Result<T, ApiError> {
    serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|e| {
        let err = ApiError::unknown(status.as_u16(), format!("Unexpected response data: {e}"));
        sentry::capture_error(&err);
        err
    })
}

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::for_server(base).unwrap();
        let auth = AuthStore::load(Arc::new(MemoryStorage::new()));
        ApiClient::new(&config, auth).unwrap()
    }

    #[test]
    fn test_route_prefixes() {
        let api = client("http://localhost:8080");
        assert_eq!(
            api.api_url("/products").as_str(),
            "http://localhost:8080/api/products"
        );
        assert_eq!(
            api.auth_url("/login").as_str(),
            "http://localhost:8080/auth/login"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let api = client("https://nongsan.vn/backend/");
        assert_eq!(
            api.api_url("/cart-items").as_str(),
            "https://nongsan.vn/backend/api/cart-items"
        );
    }

    #[test]
    fn test_query_and_segment_encoding() {
        let api = client("http://localhost:8080");
        let request = api
            .put(api.api_url(&format!("/cart-items/{}/quantity", segment("a b"))))
            .query("quantity", 3);
        assert_eq!(
            request.url.as_str(),
            "http://localhost:8080/api/cart-items/a%20b/quantity?quantity=3"
        );
    }

    #[test]
    fn test_decode_null_data() {
        let (): () = decode(StatusCode::OK, None).unwrap();
        let missing: Option<String> = decode(StatusCode::OK, Some(Value::Null)).unwrap();
        assert!(missing.is_none());
        assert!(decode::<u32>(StatusCode::OK, Some(Value::from("x"))).is_err());
    }
}
