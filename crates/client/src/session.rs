//! Session bootstrap and the token refresh timer.
//!
//! On start the access token is refreshed with the stored refresh token and
//! the profile is loaded. While logged in, a background task keeps
//! refreshing on a fixed period, brought forward when the current token
//! expires sooner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use nongsan_core::dto::LoginRequest;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::error::{self, ApiError};
use crate::stores::{AuthStore, CartStore, User, UserStore};

/// Message when there is no refresh token to send.
pub const NO_REFRESH_TOKEN: &str = "No refresh token stored";
/// Refresh this long before the access token expires.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);
/// Never schedule refreshes closer together than this.
const MIN_REFRESH_DELAY: Duration = Duration::from_secs(5);

/// Drives the signed-in session: start-up refresh, periodic refresh,
/// sign-in and sign-out.
#[derive(Clone)]
pub struct Bootstrap {
    inner: Arc<BootstrapInner>,
}

struct BootstrapInner {
    api: ApiClient,
    auth: AuthStore,
    user: UserStore,
    cart: CartStore,
    interval: Duration,
    has_run: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Bootstrap {
    #[must_use]
    pub fn new(
        api: ApiClient,
        auth: AuthStore,
        user: UserStore,
        cart: CartStore,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(BootstrapInner {
                api,
                auth,
                user,
                cart,
                interval,
                has_run: AtomicBool::new(false),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Run the start-up sequence once per process.
    ///
    /// Returns `false` without doing anything when it already ran.
    pub async fn start(&self) -> bool {
        if self.inner.has_run.swap(true, Ordering::SeqCst) {
            debug!("Bootstrap already ran");
            return false;
        }
        self.restart().await;
        true
    }

    /// Refresh, reload the profile and restart the timer, cancelling any
    /// timer already running. Call after the refresh token changes.
    #[instrument(skip(self))]
    pub async fn restart(&self) {
        self.stop().await;

        // A failed refresh leaves the session as it was.
        let _ = refresh_access_token(&self.inner.api, &self.inner.auth).await;
        if let Err(e) = self.inner.user.fetch_user().await {
            debug!(error = %e, "No profile loaded");
        }

        if self.inner.auth.is_logged_in().await {
            let handle = tokio::spawn(refresh_loop(self.inner.clone()));
            // An overlapping restart may have stored its own timer meanwhile.
            if let Some(previous) = self.inner.timer.lock().await.replace(handle) {
                previous.abort();
                debug!("Replaced a concurrently started refresh timer");
            }
            info!(interval_secs = self.inner.interval.as_secs(), "Token refresh timer started");
        }
    }

    /// Cancel the refresh timer.
    pub async fn stop(&self) {
        if let Some(handle) = self.inner.timer.lock().await.take() {
            handle.abort();
            debug!("Token refresh timer stopped");
        }
    }

    /// Whether the refresh timer is running.
    pub async fn is_refreshing(&self) -> bool {
        self.inner
            .timer
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Refresh the access token now.
    ///
    /// # Errors
    ///
    /// Returns the API error; the stored tokens are left as they were.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        refresh_access_token(&self.inner.api, &self.inner.auth).await
    }

    /// Sign in, store the tokens and restart the session with them.
    ///
    /// # Errors
    ///
    /// Returns the login error, or the profile error after a successful
    /// login.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let tokens = self.inner.api.auth().login(request).await?;
        self.inner
            .auth
            .sign_in(tokens.access_token, tokens.refresh_token)
            .await;
        self.inner.has_run.store(true, Ordering::SeqCst);
        self.restart().await;
        error::add_breadcrumb("auth", "Logged in", None);
        Ok(self.inner.user.user().await)
    }

    /// Revoke the refresh token and forget the session: tokens, profile
    /// and cart.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.stop().await;

        if let Some(refresh) = self.inner.auth.refresh_token().await
            && let Err(e) = self.inner.api.auth().logout(refresh.expose_secret()).await
        {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }

        self.inner.auth.clear_tokens().await;
        self.inner.user.clear_user().await;
        self.inner.cart.clear_cart().await;
        error::clear_sentry_user();
        self.inner.has_run.store(false, Ordering::SeqCst);
        info!("Logged out");
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("interval", &self.inner.interval)
            .field("has_run", &self.inner.has_run.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

async fn refresh_access_token(api: &ApiClient, auth: &AuthStore) -> Result<(), ApiError> {
    let Some(refresh) = auth
        .refresh_token()
        .await
        .map(|token| token.expose_secret().to_string())
        .filter(|token| !token.is_empty())
    else {
        debug!("No refresh token, skipping refresh");
        return Err(ApiError::unknown(401, NO_REFRESH_TOKEN));
    };

    match api.auth().refresh_token(&refresh).await {
        Ok(tokens) => {
            match tokens.refresh_token {
                Some(rotated) if auth.is_logged_in().await => {
                    auth.set_tokens(tokens.access_token, rotated).await;
                }
                _ => auth.set_access_token(tokens.access_token).await,
            }
            debug!("Access token refreshed");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed");
            Err(e)
        }
    }
}

async fn refresh_loop(inner: Arc<BootstrapInner>) {
    loop {
        let expiry = inner
            .auth
            .access_token()
            .await
            .and_then(|token| token_expiry(token.expose_secret()));
        let delay = next_delay(inner.interval, expiry, Utc::now());
        debug!(delay_secs = delay.as_secs(), "Next token refresh scheduled");
        tokio::time::sleep(delay).await;

        if !inner.auth.is_logged_in().await {
            info!("Session ended, token refresh timer stopping");
            return;
        }
        let _ = refresh_access_token(&inner.api, &inner.auth).await;
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry of a JWT, read from its `exp` claim without verifying it.
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// The regular interval, or less when the token expires before it.
fn next_delay(interval: Duration, expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let Some(expiry) = expiry else {
        return interval;
    };
    let until_expiry = (expiry - now).to_std().unwrap_or(Duration::ZERO);
    let due = until_expiry.saturating_sub(EXPIRY_LEEWAY);
    if due < interval {
        due.max(MIN_REFRESH_DELAY)
    } else {
        interval
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"a1","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_token_expiry_reads_exp_claim() {
        let expiry = token_expiry(&jwt(1_800_000_000)).unwrap();
        assert_eq!(expiry.timestamp(), 1_800_000_000);
    }

    #[test]
    fn test_token_expiry_ignores_opaque_tokens() {
        assert!(token_expiry("opaque-token").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
        let no_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode(br#"{"sub":"a1"}"#));
        assert!(token_expiry(&no_exp).is_none());
    }

    #[test]
    fn test_next_delay() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let hour = Duration::from_secs(3600);

        assert_eq!(next_delay(hour, None, now), hour);

        let late = now + chrono::Duration::hours(2);
        assert_eq!(next_delay(hour, Some(late), now), hour);

        let soon = now + chrono::Duration::minutes(10);
        assert_eq!(
            next_delay(hour, Some(soon), now),
            Duration::from_secs(600 - 30)
        );

        let expired = now - chrono::Duration::minutes(1);
        assert_eq!(next_delay(hour, Some(expired), now), MIN_REFRESH_DELAY);
    }
}
