//! `/api/payments` routes for VNPay.

use nongsan_core::OrderId;
use nongsan_core::dto::{OrderResponse, PaymentCreation};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct PaymentApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn payments(&self) -> PaymentApi<'_> {
        PaymentApi { api: self }
    }
}

impl PaymentApi<'_> {
    /// Start a VNPay payment; open the returned URL to pay.
    ///
    /// # Errors
    ///
    /// `order-e-01` when the order is not found.
    pub async fn create(&self, order_id: &OrderId) -> Result<PaymentCreation, ApiError> {
        self.api
            .post(
                self.api
                    .api_url(&format!("/payments/create/{}", segment(order_id.as_str()))),
            )
            .data()
            .await
    }

    /// Forward VNPay's return parameters to the backend for verification.
    ///
    /// # Errors
    ///
    /// `payment-e-02` when the signature does not verify.
    pub async fn vnpay_return<'p>(
        &self,
        params: impl IntoIterator<Item = (&'p str, &'p str)>,
    ) -> Result<OrderResponse, ApiError> {
        let mut request = self.api.get(self.api.api_url("/payments/vnpay-return"));
        for (key, value) in params {
            request = request.query(key, value);
        }
        request.data().await
    }

    /// The payment status string for an order, e.g. `PAID`.
    ///
    /// # Errors
    ///
    /// `order-e-01` when the order is not found.
    pub async fn order_status(&self, order_id: &OrderId) -> Result<String, ApiError> {
        self.api
            .get(self.api.api_url(&format!(
                "/payments/order/{}/status",
                segment(order_id.as_str())
            )))
            .data()
            .await
    }
}
