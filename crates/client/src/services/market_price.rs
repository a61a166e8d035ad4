//! `/api/market-prices` routes.

use nongsan_core::MarketPriceId;
use nongsan_core::dto::{
    ApiAck, MarketPriceCreationRequest, MarketPricePatchRequest, MarketPriceResponse,
};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct MarketPriceApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn market_prices(&self) -> MarketPriceApi<'_> {
        MarketPriceApi { api: self }
    }
}

impl MarketPriceApi<'_> {
    fn url(&self, id: &MarketPriceId) -> url::Url {
        self.api
            .api_url(&format!("/market-prices/{}", segment(id.as_str())))
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<MarketPriceResponse>, ApiError> {
        self.api
            .get(self.api.api_url("/market-prices"))
            .data()
            .await
    }

    /// # Errors
    ///
    /// `market-price-e-01` when not found.
    pub async fn get(&self, id: &MarketPriceId) -> Result<MarketPriceResponse, ApiError> {
        self.api.get(self.url(id)).data().await
    }

    /// Record a price observation.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    pub async fn create(
        &self,
        request: &MarketPriceCreationRequest,
    ) -> Result<MarketPriceResponse, ApiError> {
        self.api
            .post(self.api.api_url("/market-prices"))
            .json(request)
            .data()
            .await
    }

    /// # Errors
    ///
    /// `market-price-e-01` when not found.
    pub async fn patch(
        &self,
        id: &MarketPriceId,
        request: &MarketPricePatchRequest,
    ) -> Result<MarketPriceResponse, ApiError> {
        self.api.patch(self.url(id)).json(request).data().await
    }

    /// # Errors
    ///
    /// `market-price-e-01` when not found.
    pub async fn delete(&self, id: &MarketPriceId) -> Result<ApiAck, ApiError> {
        self.api.delete(self.url(id)).ack().await
    }
}
