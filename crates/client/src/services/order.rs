//! `/api/orders` routes.

use nongsan_core::OrderId;
use nongsan_core::dto::{ChangeOrderStatusRequest, OrderRequest, OrderResponse};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct OrderApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn orders(&self) -> OrderApi<'_> {
        OrderApi { api: self }
    }
}

impl OrderApi<'_> {
    fn url(&self, path: &str) -> url::Url {
        self.api.api_url(&format!("/orders{path}"))
    }

    /// Place one order with a single farm. The referenced cart items are
    /// removed from the cart server-side.
    ///
    /// # Errors
    ///
    /// `cart-item-e-01` when a referenced cart item no longer exists.
    pub async fn create(&self, request: &OrderRequest) -> Result<OrderResponse, ApiError> {
        self.api.post(self.url("")).json(request).data().await
    }

    /// The consumer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn my_orders(&self) -> Result<Vec<OrderResponse>, ApiError> {
        self.api.get(self.url("")).data().await
    }

    /// # Errors
    ///
    /// `order-e-01` when not found.
    pub async fn get(&self, id: &OrderId) -> Result<OrderResponse, ApiError> {
        self.api
            .get(self.url(&format!("/{}", segment(id.as_str()))))
            .data()
            .await
    }

    /// Orders placed with the signed-in farmer.
    ///
    /// # Errors
    ///
    /// Returns an error if the account has no farm.
    pub async fn farmer_orders(&self) -> Result<Vec<OrderResponse>, ApiError> {
        self.api.get(self.url("/farmer")).data().await
    }

    /// Cancel or mark received, as the buyer.
    ///
    /// # Errors
    ///
    /// `order-e-02`, `order-e-05` or `order-e-06` when the transition is
    /// not allowed.
    pub async fn consumer_change_status(
        &self,
        request: &ChangeOrderStatusRequest,
    ) -> Result<OrderResponse, ApiError> {
        self.api
            .post(self.url("/consumer/change-status"))
            .json(request)
            .data()
            .await
    }

    /// Confirm, ship, deliver or cancel, as the seller.
    ///
    /// # Errors
    ///
    /// `order-e-02` through `order-e-06` when the transition is not
    /// allowed.
    pub async fn farmer_change_status(
        &self,
        request: &ChangeOrderStatusRequest,
    ) -> Result<OrderResponse, ApiError> {
        self.api
            .post(self.url("/farmer/change-status"))
            .json(request)
            .data()
            .await
    }
}
