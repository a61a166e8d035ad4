//! Regional market price records (admin-curated).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{MarketPriceId, ProductId, Vnd};

/// The slim product view embedded in a market price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPriceProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub unit_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPriceResponse {
    pub id: MarketPriceId,
    pub price: Vnd,
    pub date_recorded: NaiveDate,
    pub region: String,
    pub product: Option<MarketPriceProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPriceCreationRequest {
    pub price: Vnd,
    pub date_recorded: NaiveDate,
    pub region: String,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPricePatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Vnd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_recorded: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}
