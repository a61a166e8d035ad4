//! Cart actions: call the cart-item service, update the cart store, and
//! tell the user how it went.

use nongsan_core::dto::{CartItemPatch, CartItemRequest, CartItemResponse};
use nongsan_core::{CartItemId, ProductId, Vnd};
use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notify::{Notifier, Toast};
use crate::stores::CartStore;

const LOAD_FAILED: &str = "Không thể tải giỏ hàng";

/// Success text and the error text used when the failure carries none.
struct Messages {
    success: &'static str,
    failed: &'static str,
}

const UPDATE_QUANTITY: Messages = Messages {
    success: "Đã cập nhật số lượng",
    failed: "Không thể cập nhật số lượng",
};

const DELETE_ITEM: Messages = Messages {
    success: "Đã xóa sản phẩm khỏi giỏ hàng",
    failed: "Không thể xóa sản phẩm",
};

const CLEAR_CART: Messages = Messages {
    success: "Đã xóa toàn bộ giỏ hàng",
    failed: "Không thể xóa giỏ hàng",
};

const ADD_TO_CART: Messages = Messages {
    success: "Đã thêm sản phẩm vào giỏ hàng",
    failed: "Không thể thêm vào giỏ hàng",
};

impl Messages {
    /// Network failures carry a message too, so they read like any other.
    fn error(&self, e: &ApiError) -> String {
        if e.message.is_empty() {
            self.failed.to_string()
        } else {
            e.message.clone()
        }
    }
}

/// The shopping cart as a user drives it.
#[derive(Debug, Clone)]
pub struct Cart {
    api: ApiClient,
    store: CartStore,
    notifier: Notifier,
}

impl Cart {
    #[must_use]
    pub const fn new(api: ApiClient, store: CartStore, notifier: Notifier) -> Self {
        Self {
            api,
            store,
            notifier,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    pub async fn items(&self) -> Vec<CartItemResponse> {
        self.store.items().await
    }

    pub async fn is_loading(&self) -> bool {
        self.store.is_loading().await
    }

    pub async fn error(&self) -> Option<String> {
        self.store.error().await
    }

    /// Sum of quantities; 0 for an empty cart.
    pub async fn total_items(&self) -> u32 {
        self.store.total_items().await
    }

    /// Sum of line totals; 0 for an empty cart.
    pub async fn total_price(&self) -> Vnd {
        self.store.total_price().await
    }

    pub async fn item_by_id(&self, id: &CartItemId) -> Option<CartItemResponse> {
        self.store.item_by_id(id).await
    }

    /// Replace the local cart with the server's.
    #[instrument(skip(self))]
    pub async fn fetch_cart_items(&self) {
        self.store.set_loading(true).await;
        self.store.set_error(None).await;

        match self.api.cart_items().list().await {
            Ok(items) => {
                debug!(count = items.len(), "Loaded cart");
                self.store.set_items(items).await;
            }
            Err(e) => {
                self.store.set_error(Some(e.message)).await;
                self.notifier.toast(Toast::error(LOAD_FAILED));
            }
        }

        self.store.set_loading(false).await;
    }

    /// Set a line's quantity. Quantities below 1 are ignored.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, id: &CartItemId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.store.set_loading(true).await;

        match self.api.cart_items().update_quantity(id, quantity).await {
            Ok(_) => {
                self.store
                    .update_item(id, CartItemPatch::quantity(quantity))
                    .await;
                self.notifier.toast(Toast::success(UPDATE_QUANTITY.success));
            }
            Err(e) => self.notifier.toast(Toast::error(UPDATE_QUANTITY.error(&e))),
        }

        self.store.set_loading(false).await;
    }

    #[instrument(skip(self))]
    pub async fn delete_cart_item(&self, id: &CartItemId) {
        self.store.set_loading(true).await;

        match self.api.cart_items().delete(id).await {
            Ok(_) => {
                self.store.remove_item(id).await;
                self.notifier.toast(Toast::success(DELETE_ITEM.success));
            }
            Err(e) => self.notifier.toast(Toast::error(DELETE_ITEM.error(&e))),
        }

        self.store.set_loading(false).await;
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self) {
        self.store.set_loading(true).await;

        match self.api.cart_items().clear().await {
            Ok(_) => {
                self.store.clear_cart().await;
                self.notifier.toast(Toast::success(CLEAR_CART.success));
            }
            Err(e) => self.notifier.toast(Toast::error(CLEAR_CART.error(&e))),
        }

        self.store.set_loading(false).await;
    }

    /// Add `quantity` of a product, then reload the cart so prices and
    /// merged quantities come from the server.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) {
        self.store.set_loading(true).await;

        let request = CartItemRequest {
            product_id: product_id.clone(),
            quantity,
        };
        match self.api.cart_items().add(&request).await {
            Ok(_) => {
                self.fetch_cart_items().await;
                self.notifier.toast(Toast::success(ADD_TO_CART.success));
            }
            Err(e) => self.notifier.toast(Toast::error(ADD_TO_CART.error(&e))),
        }

        self.store.set_loading(false).await;
    }
}
