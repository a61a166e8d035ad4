//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `NONGSAN_SERVER_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `NONGSAN_INTERVAL_REFRESH_TOKEN` - Access token lifetime in seconds
//!   (default: 3600); the refresh timer fires at 90% of it
//! - `NONGSAN_STATE_DIR` - Directory for persisted stores (default: `.nongsan`)
//! - `NONGSAN_HTTP_TIMEOUT_SECS` - Per-request timeout, none when unset
//! - `NONGSAN_GEMINI_API_KEY` - Gemini key for the AgriBot assistant
//! - `NONGSAN_GEMINI_MODEL` - Gemini model (default: `gemini-2.5-flash`)
//! - `NONGSAN_GEMINI_URL` - Gemini API base URL
//! - `NONGSAN_OPENWEATHER_API_KEY` - OpenWeather key for weather lookups
//! - `NONGSAN_OPENWEATHER_URL` - OpenWeather API base URL
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
const DEFAULT_REFRESH_SECS: u64 = 3600;
const DEFAULT_STATE_DIR: &str = ".nongsan";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; `/api` and `/auth` routes hang off it.
    pub server_url: Url,
    /// Access token lifetime in seconds.
    pub interval_refresh_token: u64,
    /// Directory holding one JSON file per persisted store.
    pub state_dir: PathBuf,
    /// Per-request timeout.
    pub http_timeout: Option<Duration>,
    /// Gemini key; the assistant answers with an error without one.
    pub gemini_api_key: Option<SecretString>,
    pub gemini_model: String,
    pub gemini_url: Url,
    /// OpenWeather key; weather lookups fail without one.
    pub openweather_api_key: Option<SecretString>,
    pub openweather_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let server_url = parse_server_url(
            "NONGSAN_SERVER_URL",
            &get_env_or_default("NONGSAN_SERVER_URL", DEFAULT_SERVER_URL),
        )?;
        let interval_refresh_token = get_env_or_default(
            "NONGSAN_INTERVAL_REFRESH_TOKEN",
            &DEFAULT_REFRESH_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("NONGSAN_INTERVAL_REFRESH_TOKEN".to_string(), e.to_string())
        })?;
        let state_dir = PathBuf::from(get_env_or_default("NONGSAN_STATE_DIR", DEFAULT_STATE_DIR));
        let http_timeout = get_optional_env("NONGSAN_HTTP_TIMEOUT_SECS")
            .map(|value| {
                value.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "NONGSAN_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;
        let gemini_url = parse_server_url(
            "NONGSAN_GEMINI_URL",
            &get_env_or_default("NONGSAN_GEMINI_URL", DEFAULT_GEMINI_URL),
        )?;
        let openweather_url = parse_server_url(
            "NONGSAN_OPENWEATHER_URL",
            &get_env_or_default("NONGSAN_OPENWEATHER_URL", DEFAULT_OPENWEATHER_URL),
        )?;

        Ok(Self {
            server_url,
            interval_refresh_token,
            state_dir,
            http_timeout,
            gemini_api_key: get_optional_env("NONGSAN_GEMINI_API_KEY").map(SecretString::from),
            gemini_model: get_env_or_default("NONGSAN_GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_url,
            openweather_api_key: get_optional_env("NONGSAN_OPENWEATHER_API_KEY")
                .map(SecretString::from),
            openweather_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Defaults pointed at `server_url`, for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `server_url` is not an
    /// absolute http(s) URL.
    pub fn for_server(server_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: parse_server_url("server_url", server_url)?,
            interval_refresh_token: DEFAULT_REFRESH_SECS,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            http_timeout: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_url: parse_server_url("gemini_url", DEFAULT_GEMINI_URL)?,
            openweather_api_key: None,
            openweather_url: parse_server_url("openweather_url", DEFAULT_OPENWEATHER_URL)?,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Period of the token refresh timer: 90% of the token lifetime, so the
    /// new token lands before the old one expires.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.interval_refresh_token.saturating_mul(900))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_server_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_interval_is_ninety_percent() {
        let mut config = ClientConfig::for_server("http://localhost:8080").unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_millis(3_240_000));

        config.interval_refresh_token = 10;
        assert_eq!(config.refresh_interval(), Duration::from_secs(9));
    }

    #[test]
    fn test_for_server_rejects_bad_urls() {
        assert!(ClientConfig::for_server("localhost:8080/api").is_err());
        assert!(ClientConfig::for_server("ftp://files.nongsan.vn").is_err());
        assert!(ClientConfig::for_server("not a url").is_err());
    }

    #[test]
    fn test_for_server_leaves_assistant_keys_unset() {
        let config = ClientConfig::for_server("http://localhost:8080").unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.openweather_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.openweather_url.host_str(), Some("api.openweathermap.org"));
    }

    #[test]
    fn test_parse_server_url_keeps_path_prefix() {
        let url = parse_server_url("TEST", "https://nongsan.vn/backend").unwrap();
        assert_eq!(url.path(), "/backend");
    }
}
