//! Product records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, OcopId, OcopStatus, ProductId, ProductStatus, Vnd};

use super::{FarmerResponse, ImageResponse, OcopProductResponse};

/// Full product detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Vnd>,
    pub inventory: Option<u32>,
    pub sold: Option<u32>,
    pub rating: Option<f64>,
    pub thumbnail: Option<String>,
    /// Selling unit, e.g. "kg" or "bó".
    pub unit_price: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub images: Vec<ImageResponse>,
    /// Category name.
    pub category: Option<String>,
    pub farmer: Option<FarmerResponse>,
    pub ocop: Option<OcopProductResponse>,
    pub created_at: Option<NaiveDateTime>,
}

/// Compact OCOP badge shown on product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcopBadge {
    pub id: OcopId,
    pub star: Option<u8>,
    #[serde(default)]
    pub status: OcopStatus,
}

/// Product card from the public listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTag {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Vnd>,
    pub sold: Option<u32>,
    pub rating: Option<f64>,
    pub thumbnail: Option<String>,
    pub unit_price: Option<String>,
    pub category_id: Option<CategoryId>,
    pub farmer: Option<FarmerResponse>,
    #[serde(default)]
    pub ocop: Option<OcopBadge>,
}

impl ProductTag {
    /// Whether the product carries a verified OCOP certificate.
    #[must_use]
    pub fn is_ocop_verified(&self) -> bool {
        self.ocop
            .as_ref()
            .is_some_and(|ocop| ocop.status == OcopStatus::Verified)
    }
}

/// Product ID and name pair, used by pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductName {
    pub id: ProductId,
    pub name: String,
}

/// Create or update a product (farmer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: Vnd,
    pub inventory: u32,
    pub thumbnail: String,
    pub unit_price: String,
    #[serde(default)]
    pub image_paths: Vec<String>,
    pub category_id: CategoryId,
}

/// Admin moderation of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProductStatusRequest {
    pub id: ProductId,
    pub status: ProductStatus,
}
