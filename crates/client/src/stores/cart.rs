//! Cached server cart (`cart-storage`).
//!
//! Only `items` is persisted; loading and error flags reset on restart.

use std::sync::Arc;

use nongsan_core::dto::{CartItemPatch, CartItemResponse};
use nongsan_core::{CartItemId, Vnd};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::storage::Storage;

/// Storage key of the cart store.
pub const STORAGE_KEY: &str = "cart-storage";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartItemResponse>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl CartState {
    /// Sum of item quantities, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.quantity)
            .fold(0u32, u32::saturating_add)
    }

    /// Sum of price × quantity; items without a product price count as 0.
    #[must_use]
    pub fn total_price(&self) -> Vnd {
        self.items.iter().filter_map(CartItemResponse::line_total).sum()
    }

    #[must_use]
    pub fn item_by_id(&self, id: &CartItemId) -> Option<&CartItemResponse> {
        self.items.iter().find(|item| &item.id == id)
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedCart {
    items: Vec<CartItemResponse>,
}

/// Shared handle to the cart state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: RwLock<CartState>,
    storage: Arc<dyn Storage>,
}

impl CartStore {
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let items = super::restore::<PersistedCart>(storage.as_ref(), STORAGE_KEY)
            .map(|persisted| persisted.items)
            .unwrap_or_default();
        Self {
            inner: Arc::new(CartStoreInner {
                state: RwLock::new(CartState {
                    items,
                    ..CartState::default()
                }),
                storage,
            }),
        }
    }

    pub async fn snapshot(&self) -> CartState {
        self.inner.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<CartItemResponse> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.state.read().await.error.clone()
    }

    pub async fn total_items(&self) -> u32 {
        self.inner.state.read().await.total_items()
    }

    pub async fn total_price(&self) -> Vnd {
        self.inner.state.read().await.total_price()
    }

    pub async fn item_by_id(&self, id: &CartItemId) -> Option<CartItemResponse> {
        self.inner.state.read().await.item_by_id(id).cloned()
    }

    /// Replace the cached items with a fresh server copy.
    pub async fn set_items(&self, items: Vec<CartItemResponse>) {
        self.update(|state| {
            state.items = items;
            state.error = None;
        })
        .await;
    }

    pub async fn add_item(&self, item: CartItemResponse) {
        self.update(|state| state.items.push(item)).await;
    }

    /// Apply `patch` to the item with `id`, if cached.
    pub async fn update_item(&self, id: &CartItemId, patch: CartItemPatch) {
        self.update(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
                patch.apply(item);
            }
        })
        .await;
    }

    pub async fn remove_item(&self, id: &CartItemId) {
        self.update(|state| state.items.retain(|item| &item.id != id))
            .await;
    }

    pub async fn clear_cart(&self) {
        self.update(|state| state.items.clear()).await;
    }

    pub async fn set_loading(&self, is_loading: bool) {
        self.inner.state.write().await.is_loading = is_loading;
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.inner.state.write().await.error = error;
    }

    async fn update(&self, mutate: impl FnOnce(&mut CartState)) {
        let mut state = self.inner.state.write().await;
        mutate(&mut state);
        super::persist(
            self.inner.storage.as_ref(),
            STORAGE_KEY,
            &PersistedCart {
                items: state.items.clone(),
            },
        );
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn item(id: &str, quantity: u32, price: Option<i64>) -> CartItemResponse {
        let product = price.map(|price| {
            serde_json::from_value(serde_json::json!({
                "id": format!("p-{id}"),
                "name": "Bưởi da xanh",
                "price": price,
            }))
            .unwrap()
        });
        CartItemResponse {
            id: CartItemId::new(id),
            quantity,
            product,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_totals_skip_items_without_price() {
        let store = CartStore::load(Arc::new(MemoryStorage::new()));
        store
            .set_items(vec![
                item("a", 2, Some(45_000)),
                item("b", 1, None),
                item("c", 3, Some(10_000)),
            ])
            .await;

        assert_eq!(store.total_items().await, 6);
        assert_eq!(store.total_price().await, Vnd::new(120_000));
    }

    #[test]
    fn test_total_items_saturates() {
        let state = CartState {
            items: vec![item("a", u32::MAX, None), item("b", 2, None)],
            ..CartState::default()
        };
        assert_eq!(state.total_items(), u32::MAX);
    }

    #[tokio::test]
    async fn test_update_and_remove_items() {
        let store = CartStore::load(Arc::new(MemoryStorage::new()));
        store.set_error(Some("old".to_string())).await;
        store.set_items(vec![item("a", 1, Some(5_000))]).await;
        assert!(store.error().await.is_none());

        store.add_item(item("b", 1, Some(1_000))).await;
        store
            .update_item(&CartItemId::new("a"), CartItemPatch::quantity(4))
            .await;
        store
            .update_item(&CartItemId::new("missing"), CartItemPatch::quantity(9))
            .await;
        assert_eq!(
            store.item_by_id(&CartItemId::new("a")).await.unwrap().quantity,
            4
        );

        store.remove_item(&CartItemId::new("b")).await;
        assert_eq!(store.items().await.len(), 1);

        store.clear_cart().await;
        assert_eq!(store.total_price().await, Vnd::ZERO);
    }

    #[tokio::test]
    async fn test_only_items_are_persisted() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = CartStore::load(Arc::clone(&storage));
        store.set_items(vec![item("a", 2, Some(1_000))]).await;
        store.set_loading(true).await;
        store.set_error(Some("boom".to_string())).await;

        let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"items\""));
        assert!(!raw.contains("boom"));

        let reloaded = CartStore::load(storage).snapshot().await;
        assert_eq!(reloaded.items.len(), 1);
        assert!(!reloaded.is_loading);
        assert!(reloaded.error.is_none());
    }
}
