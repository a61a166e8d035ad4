//! Multi-farmer checkout.
//!
//! Each order goes to a single farm, so a cart is split into one pending
//! order per farmer. Pending orders survive a restart and are submitted one
//! by one; whatever fails stays pending for another attempt.

use std::collections::BTreeMap;

use nongsan_core::dto::{CartItemResponse, OrderItemRequest, OrderRequest, OrderResponse};
use nongsan_core::{AddressId, FarmerId, PaymentMethod, Vnd};
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::error::{self, ApiError};
use crate::stores::{OrderStore, PendingOrder, PendingOrderItem};

/// Name used for a line whose product is unknown.
pub const DEFAULT_PRODUCT_NAME: &str = "Sản phẩm";
/// Name used for a farm without one.
pub const DEFAULT_FARMER_NAME: &str = "Không xác định";

/// Cart lines sold by one farmer.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmerGroup {
    pub farmer_id: FarmerId,
    pub farmer_name: Option<String>,
    pub items: Vec<CartItemResponse>,
}

/// Group cart lines by the farm selling them, in farmer ID order.
///
/// Lines whose product carries no farmer cannot be ordered and are left out.
#[must_use]
pub fn group_by_farmer(items: &[CartItemResponse]) -> Vec<FarmerGroup> {
    let mut groups: BTreeMap<FarmerId, FarmerGroup> = BTreeMap::new();
    for item in items {
        let Some(farmer) = item.product.as_ref().and_then(|p| p.farmer.as_ref()) else {
            warn!(cart_item_id = %item.id, "Cart item has no farmer, skipping");
            continue;
        };
        groups
            .entry(farmer.id.clone())
            .or_insert_with(|| FarmerGroup {
                farmer_id: farmer.id.clone(),
                farmer_name: farmer.name.clone(),
                items: Vec::new(),
            })
            .items
            .push(item.clone());
    }
    groups.into_values().collect()
}

/// Outcome of submitting the pending orders.
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    /// Orders the backend accepted.
    pub created: Vec<OrderResponse>,
    /// Temporary IDs of orders that failed, with the reason.
    pub failed: Vec<(String, ApiError)>,
}

impl SubmitOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Checkout {
    api: ApiClient,
    orders: OrderStore,
}

impl Checkout {
    #[must_use]
    pub const fn new(api: ApiClient, orders: OrderStore) -> Self {
        Self { api, orders }
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Replace the pending orders with one per farmer group.
    #[instrument(skip(self, farmer_groups), fields(groups = farmer_groups.len()))]
    pub async fn create_pending_orders(
        &self,
        farmer_groups: &[FarmerGroup],
        note: &str,
        address_id: &AddressId,
    ) {
        self.orders.clear_pending_orders().await;

        for group in farmer_groups {
            let request = OrderRequest {
                note: note.to_string(),
                address_id: address_id.clone(),
                farmer_id: group.farmer_id.clone(),
                items: group
                    .items
                    .iter()
                    .map(|item| OrderItemRequest {
                        cart_item_id: item.id.clone(),
                    })
                    .collect(),
                payment_method: PaymentMethod::default(),
            };
            let items = group.items.iter().map(pending_item).collect();
            let farmer_name = group
                .farmer_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_FARMER_NAME);

            self.orders
                .add_pending_order(PendingOrder::from_request(request, farmer_name, items))
                .await;
        }
    }

    /// Send every pending order with `payment_method`.
    ///
    /// Accepted orders leave the pending list and become the
    /// `last_created_orders`; rejected ones stay pending.
    #[instrument(skip(self))]
    pub async fn submit_pending_orders(&self, payment_method: PaymentMethod) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::default();
        self.orders.set_loading(true).await;
        self.orders.set_error(None).await;

        // Oldest first, in the order the user built them.
        let mut pending = self.orders.pending_orders().await;
        pending.reverse();

        for order in pending {
            let request = OrderRequest {
                payment_method,
                ..order.request.clone()
            };
            match self.api.orders().create(&request).await {
                Ok(created) => {
                    info!(temp_id = %order.temp_id, order_id = %created.id, "Order placed");
                    self.orders.remove_pending_order(&order.temp_id).await;
                    self.orders.add_order(created.clone()).await;
                    outcome.created.push(created);
                }
                Err(e) => {
                    warn!(temp_id = %order.temp_id, error = %e, "Order was not placed");
                    self.orders.set_error(Some(e.localized())).await;
                    outcome.failed.push((order.temp_id, e));
                }
            }
        }

        if !outcome.created.is_empty() {
            self.orders
                .set_last_created_orders(outcome.created.clone())
                .await;
            let count = outcome.created.len().to_string();
            error::add_breadcrumb("order", "Placed orders", Some(&[("count", count.as_str())]));
        }
        self.orders.set_loading(false).await;
        outcome
    }
}

fn pending_item(item: &CartItemResponse) -> PendingOrderItem {
    let product = item.product.as_ref();
    PendingOrderItem {
        cart_item_id: item.id.clone(),
        product_name: product
            .map(|p| p.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
        quantity: item.quantity,
        price: product.and_then(|p| p.price).unwrap_or(Vnd::ZERO),
        thumbnail: product.and_then(|p| p.thumbnail.clone()),
    }
}
