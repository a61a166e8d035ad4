//! Cart item records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, ProductId, Vnd};

use super::ProductResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A line in the signed-in user's server-side cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<ProductResponse>,
    pub created_at: Option<NaiveDateTime>,
}

impl CartItemResponse {
    /// Unit price × quantity, or `None` when the product or its price is
    /// missing.
    #[must_use]
    pub fn line_total(&self) -> Option<Vnd> {
        self.product
            .as_ref()
            .and_then(|product| product.price)
            .map(|price| price.times(self.quantity))
    }
}

/// Partial update applied to a cached cart item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartItemPatch {
    pub quantity: Option<u32>,
    pub product: Option<ProductResponse>,
}

impl CartItemPatch {
    /// A patch that only changes the quantity.
    #[must_use]
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Apply the set fields to `item`.
    pub fn apply(self, item: &mut CartItemResponse) {
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(product) = self.product {
            item.product = Some(product);
        }
    }
}
