//! `/api/cart-items` routes.

use nongsan_core::CartItemId;
use nongsan_core::dto::{ApiAck, CartItemRequest, CartItemResponse};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct CartItemApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn cart_items(&self) -> CartItemApi<'_> {
        CartItemApi { api: self }
    }
}

impl CartItemApi<'_> {
    /// Add a product, or increase its quantity if already in the cart.
    ///
    /// # Errors
    ///
    /// `product-e-01` when the product does not exist.
    pub async fn add(&self, request: &CartItemRequest) -> Result<CartItemResponse, ApiError> {
        self.api
            .post(self.api.api_url("/cart-items"))
            .json(request)
            .data()
            .await
    }

    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn list(&self) -> Result<Vec<CartItemResponse>, ApiError> {
        self.api.get(self.api.api_url("/cart-items")).data().await
    }

    /// # Errors
    ///
    /// `cart-item-e-01` when the item is not in the cart.
    pub async fn update_quantity(&self, id: &CartItemId, quantity: u32) -> Result<ApiAck, ApiError> {
        self.api
            .put(
                self.api
                    .api_url(&format!("/cart-items/{}/quantity", segment(id.as_str()))),
            )
            .query("quantity", quantity)
            .ack()
            .await
    }

    /// # Errors
    ///
    /// `cart-item-e-01` when the item is not in the cart.
    pub async fn delete(&self, id: &CartItemId) -> Result<ApiAck, ApiError> {
        self.api
            .delete(
                self.api
                    .api_url(&format!("/cart-items/{}", segment(id.as_str()))),
            )
            .ack()
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn clear(&self) -> Result<ApiAck, ApiError> {
        self.api
            .delete(self.api.api_url("/cart-items/clear"))
            .ack()
            .await
    }
}
