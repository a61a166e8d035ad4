//! Authentication tokens and login state (`auth-storage`).

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::storage::Storage;

/// Storage key of the auth store.
pub const STORAGE_KEY: &str = "auth-storage";

const DEFAULT_REDIRECT: &str = "/";

/// Snapshot of the auth state.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    /// Where to go after logging in.
    pub redirect: String,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_logged_in: false,
            access_token: None,
            refresh_token: None,
            redirect: DEFAULT_REDIRECT.to_string(),
        }
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("is_logged_in", &self.is_logged_in)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// On-disk shape; the whole state is persisted.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    is_logged_in: bool,
    access_token: Option<String>,
    refresh_token: Option<String>,
    redirect: String,
}

impl From<&AuthState> for PersistedAuth {
    fn from(state: &AuthState) -> Self {
        Self {
            is_logged_in: state.is_logged_in,
            access_token: state
                .access_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            refresh_token: state
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            redirect: state.redirect.clone(),
        }
    }
}

impl From<PersistedAuth> for AuthState {
    fn from(persisted: PersistedAuth) -> Self {
        Self {
            is_logged_in: persisted.is_logged_in,
            access_token: persisted.access_token.map(SecretString::from),
            refresh_token: persisted.refresh_token.map(SecretString::from),
            redirect: persisted.redirect,
        }
    }
}

/// Shared handle to the auth state.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
    state: RwLock<AuthState>,
    storage: Arc<dyn Storage>,
}

impl AuthStore {
    /// Load the persisted state, or start logged out.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let state = super::restore::<PersistedAuth>(storage.as_ref(), STORAGE_KEY)
            .map(AuthState::from)
            .unwrap_or_default();
        Self {
            inner: Arc::new(AuthStoreInner {
                state: RwLock::new(state),
                storage,
            }),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> AuthState {
        self.inner.state.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.state.read().await.is_logged_in
    }

    pub async fn access_token(&self) -> Option<SecretString> {
        self.inner.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<SecretString> {
        self.inner.state.read().await.refresh_token.clone()
    }

    pub async fn redirect(&self) -> String {
        self.inner.state.read().await.redirect.clone()
    }

    /// The token to send as `Authorization: Bearer`, present only while
    /// logged in with a non-empty access token.
    pub async fn bearer(&self) -> Option<SecretString> {
        let state = self.inner.state.read().await;
        if !state.is_logged_in {
            return None;
        }
        state
            .access_token
            .as_ref()
            .filter(|token| !token.expose_secret().is_empty())
            .cloned()
    }

    /// Store a fresh token pair and mark the session logged in.
    pub async fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        self.update(|state| {
            state.is_logged_in = true;
            state.access_token = Some(SecretString::from(access_token.into()));
            state.refresh_token = Some(SecretString::from(refresh_token.into()));
        })
        .await;
        tracing::debug!("Stored new token pair");
    }

    /// Mark the session logged in after a login. The stored refresh token
    /// is kept when the response carries none.
    pub async fn sign_in(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
        self.update(|state| {
            state.is_logged_in = true;
            state.access_token = Some(SecretString::from(access_token.into()));
            if let Some(refresh) = refresh_token.filter(|token| !token.is_empty()) {
                state.refresh_token = Some(SecretString::from(refresh));
            }
        })
        .await;
        tracing::debug!("Signed in");
    }

    /// Replace only the access token, as a refresh does.
    pub async fn set_access_token(&self, access_token: impl Into<String>) {
        self.update(|state| {
            state.access_token = Some(SecretString::from(access_token.into()));
        })
        .await;
    }

    /// Log out locally. The redirect target is kept.
    pub async fn clear_tokens(&self) {
        self.update(|state| {
            state.is_logged_in = false;
            state.access_token = None;
            state.refresh_token = None;
        })
        .await;
        tracing::debug!("Cleared tokens");
    }

    pub async fn set_redirect(&self, redirect: impl Into<String>) {
        self.update(|state| state.redirect = redirect.into()).await;
    }

    async fn update(&self, mutate: impl FnOnce(&mut AuthState)) {
        let mut state = self.inner.state.write().await;
        mutate(&mut state);
        super::persist(
            self.inner.storage.as_ref(),
            STORAGE_KEY,
            &PersistedAuth::from(&*state),
        );
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_set_and_clear_tokens() {
        let store = AuthStore::load(Arc::new(MemoryStorage::new()));
        assert!(!store.is_logged_in().await);
        assert_eq!(store.redirect().await, "/");

        store.set_redirect("/cart").await;
        store.set_tokens("access-1", "refresh-1").await;
        assert!(store.is_logged_in().await);
        assert_eq!(store.bearer().await.unwrap().expose_secret(), "access-1");

        store.clear_tokens().await;
        assert!(!store.is_logged_in().await);
        assert!(store.refresh_token().await.is_none());
        assert_eq!(store.redirect().await, "/cart");
    }

    #[tokio::test]
    async fn test_no_bearer_when_logged_out_or_empty() {
        let store = AuthStore::load(Arc::new(MemoryStorage::new()));
        store.set_access_token("orphan").await;
        assert!(store.bearer().await.is_none());

        store.set_tokens("", "r").await;
        assert!(store.bearer().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_keeps_refresh_token_when_none_returned() {
        let store = AuthStore::load(Arc::new(MemoryStorage::new()));
        store.sign_in("access-1", None).await;
        assert!(store.is_logged_in().await);
        assert!(store.refresh_token().await.is_none());

        store.sign_in("access-2", Some("refresh-1".to_string())).await;
        store.sign_in("access-3", Some(String::new())).await;
        store.sign_in("access-4", None).await;

        let state = store.snapshot().await;
        assert_eq!(state.access_token.unwrap().expose_secret(), "access-4");
        assert_eq!(state.refresh_token.unwrap().expose_secret(), "refresh-1");
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::load(Arc::clone(&storage));
        store.set_tokens("a", "r").await;
        store.set_access_token("a2").await;

        let reloaded = AuthStore::load(storage);
        let state = reloaded.snapshot().await;
        assert!(state.is_logged_in);
        assert_eq!(state.access_token.unwrap().expose_secret(), "a2");
        assert_eq!(state.refresh_token.unwrap().expose_secret(), "r");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let state = AuthState {
            access_token: Some(SecretString::from("top-secret")),
            ..AuthState::default()
        };
        let debug = format!("{state:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
