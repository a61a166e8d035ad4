//! Signed-in user profile (`user-storage`).

use std::sync::Arc;

use nongsan_core::AccountId;
use nongsan_core::dto::AccountInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::error::{self, ApiError};
use crate::storage::Storage;

/// Storage key of the user store.
pub const STORAGE_KEY: &str = "user-storage";

/// The cached profile. Every field is optional: the store starts empty and
/// partial updates merge into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<AccountId>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub roles: Option<Vec<String>>,
}

impl User {
    /// Overwrite the fields that are set in `patch`.
    pub fn merge(&mut self, patch: Self) {
        if patch.id.is_some() {
            self.id = patch.id;
        }
        if patch.display_name.is_some() {
            self.display_name = patch.display_name;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if patch.avatar.is_some() {
            self.avatar = patch.avatar;
        }
        if patch.roles.is_some() {
            self.roles = patch.roles;
        }
    }

    /// Whether the user holds `role` (compared case-insensitively).
    #[must_use]
    pub fn has_role(&self, role: nongsan_core::Role) -> bool {
        self.roles
            .iter()
            .flatten()
            .any(|r| r.eq_ignore_ascii_case(role.as_str()))
    }
}

impl From<AccountInfo> for User {
    fn from(info: AccountInfo) -> Self {
        Self {
            id: info.id,
            display_name: info.display_name,
            email: info.email,
            avatar: info.avatar,
            roles: Some(info.roles),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedUser {
    user: User,
}

/// Shared handle to the user profile.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<UserStoreInner>,
}

struct UserStoreInner {
    user: RwLock<User>,
    storage: Arc<dyn Storage>,
    api: ApiClient,
}

impl UserStore {
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, api: ApiClient) -> Self {
        let user = super::restore::<PersistedUser>(storage.as_ref(), STORAGE_KEY)
            .map(|persisted| persisted.user)
            .unwrap_or_default();
        Self {
            inner: Arc::new(UserStoreInner {
                user: RwLock::new(user),
                storage,
                api,
            }),
        }
    }

    pub async fn user(&self) -> User {
        self.inner.user.read().await.clone()
    }

    /// Merge a partial profile into the current one.
    pub async fn set_user(&self, patch: User) {
        self.update(|user| user.merge(patch)).await;
    }

    pub async fn clear_user(&self) {
        self.update(|user| *user = User::default()).await;
    }

    /// Load `/auth/info` into the store.
    ///
    /// On failure the profile is reset to empty, so a stale user never
    /// outlives a rejected session.
    ///
    /// # Errors
    ///
    /// Returns the API error after resetting the profile.
    pub async fn fetch_user(&self) -> Result<User, ApiError> {
        match self.inner.api.auth().info().await {
            Ok(info) => {
                let fetched = User::from(info);
                if let Some(id) = &fetched.id {
                    error::set_sentry_user(id, fetched.email.as_deref());
                }
                self.update(|user| user.merge(fetched)).await;
                Ok(self.user().await)
            }
            Err(e) => {
                self.clear_user().await;
                Err(e)
            }
        }
    }

    async fn update(&self, mutate: impl FnOnce(&mut User)) {
        let mut user = self.inner.user.write().await;
        mutate(&mut user);
        super::persist(
            self.inner.storage.as_ref(),
            STORAGE_KEY,
            &PersistedUser { user: user.clone() },
        );
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nongsan_core::Role;

    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut user = User {
            id: Some(AccountId::new("a1")),
            display_name: Some("Lan".to_string()),
            email: Some("lan@nongsan.vn".to_string()),
            ..User::default()
        };
        user.merge(User {
            display_name: Some("Lan Nguyễn".to_string()),
            avatar: Some("https://cdn/a1.png".to_string()),
            ..User::default()
        });
        assert_eq!(user.id, Some(AccountId::new("a1")));
        assert_eq!(user.display_name.as_deref(), Some("Lan Nguyễn"));
        assert_eq!(user.email.as_deref(), Some("lan@nongsan.vn"));
        assert!(user.avatar.is_some());
    }

    #[test]
    fn test_has_role() {
        let user = User::from(AccountInfo {
            roles: vec!["CONSUMER".to_string(), "farmer".to_string()],
            ..AccountInfo::default()
        });
        assert!(user.has_role(Role::Farmer));
        assert!(!user.has_role(Role::Admin));
        assert!(!User::default().has_role(Role::Consumer));
    }
}
