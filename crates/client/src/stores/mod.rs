//! Client-side state stores.
//!
//! Each store is a cloneable handle over `tokio::sync::RwLock` state. After
//! every mutation the persisted part of the state is written to its storage
//! key as `{ "state": ..., "version": 0 }`, the same document a browser
//! build keeps in `localStorage`.

pub mod auth;
pub mod cart;
pub mod order;
pub mod user;

pub use auth::{AuthState, AuthStore};
pub use cart::{CartState, CartStore};
pub use order::{
    CurrentOrder, OrderState, OrderStore, PendingOrder, PendingOrderItem,
    create_pending_order_id,
};
pub use user::{User, UserStore};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::storage::{Storage, StorageError};

const STORE_VERSION: u32 = 0;

#[derive(Serialize)]
struct PersistedRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Persisted<T> {
    state: T,
}

/// Read a store's persisted state. Missing or unreadable documents yield
/// `None` so the store starts from its defaults.
pub(crate) fn restore<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get_item(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, key, "Failed to read persisted store");
            return None;
        }
    };

    match serde_json::from_str::<Persisted<T>>(&raw) {
        Ok(persisted) => Some(persisted.state),
        Err(source) => {
            let e = StorageError::Corrupt {
                key: key.to_string(),
                source,
            };
            tracing::warn!(error = %e, "Discarding persisted store");
            None
        }
    }
}

/// Write a store's persisted state. Failures are logged; the in-memory
/// state stays authoritative.
pub(crate) fn persist<T: Serialize>(storage: &dyn Storage, key: &str, state: &T) {
    let document = PersistedRef {
        state,
        version: STORE_VERSION,
    };
    let result = serde_json::to_string(&document)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
        .and_then(|json| storage.set_item(key, &json));

    if let Err(e) = result {
        tracing::error!(error = %e, key, "Failed to persist store");
    }
}
