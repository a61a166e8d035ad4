//! Order records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{
    AddressId, CartItemId, FarmerId, OrderId, OrderStatus, PaymentMethod, ProductId, Vnd,
};

use super::{AccountResponse, AddressResponse, FarmerResponse};

/// One cart line to convert into an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub cart_item_id: CartItemId,
}

/// Places one order with one farmer. A multi-farmer checkout sends one of
/// these per farmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub note: String,
    pub address_id: AddressId,
    pub farmer_id: FarmerId,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Product snapshot stored on an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemProduct {
    pub id: ProductId,
    pub name: String,
    pub thumbnail: Option<String>,
    pub price: Option<Vnd>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Composite key; its shape is backend-defined.
    #[serde(default)]
    pub order_item_id: serde_json::Value,
    pub quantity: u32,
    pub product: Option<OrderItemProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub total_price: Option<Vnd>,
    pub total_quantity: Option<u32>,
    pub note: Option<String>,
    #[serde(default)]
    pub last_status_change_reason: Option<String>,
    pub status: OrderStatus,
    pub address: Option<AddressResponse>,
    pub account: Option<AccountResponse>,
    #[serde(default)]
    pub farmer: Option<FarmerResponse>,
    #[serde(default)]
    pub order_items: Vec<OrderItemResponse>,
    pub created_at: Option<NaiveDateTime>,
}

/// Consumer or farmer request to move an order to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOrderStatusRequest {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
