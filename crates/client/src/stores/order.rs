//! Server orders plus locally tracked pending orders (`order-storage`).
//!
//! A multi-farmer checkout becomes one pending order per farmer until the
//! backend confirms it. Only `pending_orders` and `last_created_orders`
//! survive a restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use nongsan_core::dto::{ChangeOrderStatusRequest, OrderRequest, OrderResponse};
use nongsan_core::{CartItemId, FarmerId, OrderActor, OrderId, OrderStatus, Vnd};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::error;
use crate::storage::Storage;

/// Storage key of the order store.
pub const STORAGE_KEY: &str = "order-storage";

/// Shown when the order list cannot be loaded.
pub const FETCH_ORDERS_FAILED: &str = "Không thể tải danh sách đơn hàng";
/// Shown when a status change is refused.
pub const CHANGE_STATUS_FAILED: &str = "Không thể cập nhật trạng thái đơn hàng";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Temporary ID for a pending order: `pending_<millis>_<9 base36 chars>`.
#[must_use]
pub fn create_pending_order_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| BASE36.choose(&mut rng).copied().map_or('0', char::from))
        .collect();
    format!("pending_{}_{suffix}", chrono::Utc::now().timestamp_millis())
}

/// One line of a pending order, snapshotted from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrderItem {
    pub cart_item_id: CartItemId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Vnd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// An order built at checkout but not yet confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub temp_id: String,
    pub request: OrderRequest,
    pub farmer_name: String,
    pub farmer_id: FarmerId,
    pub items: Vec<PendingOrderItem>,
    pub created_at: NaiveDateTime,
}

impl PendingOrder {
    /// Wrap `request` with a fresh temporary ID and the current time.
    #[must_use]
    pub fn from_request(
        request: OrderRequest,
        farmer_name: impl Into<String>,
        items: Vec<PendingOrderItem>,
    ) -> Self {
        Self {
            temp_id: create_pending_order_id(),
            farmer_id: request.farmer_id.clone(),
            request,
            farmer_name: farmer_name.into(),
            items,
            created_at: Local::now().naive_local(),
        }
    }

    /// Sum of price × quantity over the lines.
    #[must_use]
    pub fn total_price(&self) -> Vnd {
        self.items.iter().map(|item| item.price.times(item.quantity)).sum()
    }
}

/// Either kind of order, as listed on the "my orders" page.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentOrder {
    Confirmed(OrderResponse),
    Pending(PendingOrder),
}

impl CurrentOrder {
    #[must_use]
    pub const fn created_at(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Confirmed(order) => order.created_at,
            Self::Pending(order) => Some(order.created_at),
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderState {
    pub orders: Vec<OrderResponse>,
    pub farmer_orders: Vec<OrderResponse>,
    pub pending_orders: Vec<PendingOrder>,
    pub last_created_orders: Vec<OrderResponse>,
    pub is_loading: bool,
    pub is_loading_farmer_orders: bool,
    pub error: Option<String>,
}

impl OrderState {
    /// Confirmed plus pending orders.
    #[must_use]
    pub fn total_orders(&self) -> usize {
        self.orders.len() + self.pending_orders.len()
    }

    /// Search the consumer's orders, then the farmer's.
    #[must_use]
    pub fn order_by_id(&self, id: &OrderId) -> Option<&OrderResponse> {
        self.orders
            .iter()
            .chain(&self.farmer_orders)
            .find(|order| &order.id == id)
    }

    /// Pending orders grouped by farmer, each group in store order.
    #[must_use]
    pub fn pending_orders_by_farmer(&self) -> BTreeMap<FarmerId, Vec<PendingOrder>> {
        let mut groups: BTreeMap<FarmerId, Vec<PendingOrder>> = BTreeMap::new();
        for order in &self.pending_orders {
            groups
                .entry(order.farmer_id.clone())
                .or_default()
                .push(order.clone());
        }
        groups
    }

    /// Confirmed and pending orders merged, newest first. Orders without a
    /// timestamp sort last.
    #[must_use]
    pub fn all_current_orders(&self) -> Vec<CurrentOrder> {
        let mut all: Vec<CurrentOrder> = self
            .orders
            .iter()
            .cloned()
            .map(CurrentOrder::Confirmed)
            .chain(self.pending_orders.iter().cloned().map(CurrentOrder::Pending))
            .collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        all
    }

    fn set_status(&mut self, id: &OrderId, status: OrderStatus) {
        for order in self.orders.iter_mut().chain(self.farmer_orders.iter_mut()) {
            if &order.id == id {
                order.status = status;
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedOrders {
    #[serde(default)]
    pending_orders: Vec<PendingOrder>,
    #[serde(default)]
    last_created_orders: Vec<OrderResponse>,
}

/// Shared handle to the order state.
#[derive(Clone)]
pub struct OrderStore {
    inner: Arc<OrderStoreInner>,
}

struct OrderStoreInner {
    state: RwLock<OrderState>,
    storage: Arc<dyn Storage>,
    api: ApiClient,
}

impl OrderStore {
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, api: ApiClient) -> Self {
        let persisted = super::restore::<PersistedOrders>(storage.as_ref(), STORAGE_KEY);
        let state = persisted.map_or_else(OrderState::default, |p| OrderState {
            pending_orders: p.pending_orders,
            last_created_orders: p.last_created_orders,
            ..OrderState::default()
        });
        Self {
            inner: Arc::new(OrderStoreInner {
                state: RwLock::new(state),
                storage,
                api,
            }),
        }
    }

    pub async fn snapshot(&self) -> OrderState {
        self.inner.state.read().await.clone()
    }

    pub async fn pending_orders(&self) -> Vec<PendingOrder> {
        self.inner.state.read().await.pending_orders.clone()
    }

    pub async fn last_created_orders(&self) -> Vec<OrderResponse> {
        self.inner.state.read().await.last_created_orders.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.state.read().await.error.clone()
    }

    pub async fn total_orders(&self) -> usize {
        self.inner.state.read().await.total_orders()
    }

    pub async fn order_by_id(&self, id: &OrderId) -> Option<OrderResponse> {
        self.inner.state.read().await.order_by_id(id).cloned()
    }

    pub async fn pending_orders_by_farmer(&self) -> BTreeMap<FarmerId, Vec<PendingOrder>> {
        self.inner.state.read().await.pending_orders_by_farmer()
    }

    pub async fn all_current_orders(&self) -> Vec<CurrentOrder> {
        self.inner.state.read().await.all_current_orders()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setters
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn set_orders(&self, orders: Vec<OrderResponse>) {
        self.update(|state| state.orders = orders).await;
    }

    pub async fn set_farmer_orders(&self, orders: Vec<OrderResponse>) {
        self.update(|state| state.farmer_orders = orders).await;
    }

    /// Prepend a newly confirmed order.
    pub async fn add_order(&self, order: OrderResponse) {
        self.update(|state| state.orders.insert(0, order)).await;
    }

    /// Set the status of `id` in both the consumer and farmer lists.
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) {
        self.update(|state| state.set_status(id, status)).await;
    }

    /// Prepend a pending order.
    pub async fn add_pending_order(&self, order: PendingOrder) {
        self.update(|state| state.pending_orders.insert(0, order)).await;
    }

    pub async fn remove_pending_order(&self, temp_id: &str) {
        self.update(|state| state.pending_orders.retain(|o| o.temp_id != temp_id))
            .await;
    }

    pub async fn clear_pending_orders(&self) {
        self.update(|state| state.pending_orders.clear()).await;
    }

    pub async fn set_last_created_orders(&self, orders: Vec<OrderResponse>) {
        self.update(|state| state.last_created_orders = orders).await;
    }

    pub async fn clear_last_created_orders(&self) {
        self.update(|state| state.last_created_orders.clear()).await;
    }

    pub async fn set_loading(&self, is_loading: bool) {
        self.inner.state.write().await.is_loading = is_loading;
    }

    pub async fn set_loading_farmer_orders(&self, is_loading: bool) {
        self.inner.state.write().await.is_loading_farmer_orders = is_loading;
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.inner.state.write().await.error = error;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the consumer's orders.
    pub async fn fetch_all_orders(&self) {
        {
            let mut state = self.inner.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let result = self.inner.api.orders().my_orders().await;
        match result {
            Ok(orders) => self.set_orders(orders).await,
            Err(e) => self.set_error(Some(fetch_error_message(&e))).await,
        }

        self.set_loading(false).await;
    }

    /// Load the orders placed with the signed-in farmer.
    pub async fn fetch_farmer_orders(&self) {
        {
            let mut state = self.inner.state.write().await;
            state.is_loading_farmer_orders = true;
            state.error = None;
        }

        let result = self.inner.api.orders().farmer_orders().await;
        match result {
            Ok(orders) => self.set_farmer_orders(orders).await,
            Err(e) => self.set_error(Some(fetch_error_message(&e))).await,
        }

        self.set_loading_farmer_orders(false).await;
    }

    /// Ask the backend to move `order_id` to `status` on behalf of `actor`.
    ///
    /// A change the lifecycle forbids for a locally known order is refused
    /// without a request. Returns whether the change was applied.
    pub async fn change_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        actor: OrderActor,
    ) -> bool {
        if let Some(current) = self.order_by_id(order_id).await
            && !current.status.can_transition(actor, status)
        {
            tracing::warn!(
                order_id = %order_id,
                from = %current.status,
                to = %status,
                "Refusing order status change"
            );
            self.set_error(Some(CHANGE_STATUS_FAILED.to_string())).await;
            return false;
        }

        let request = ChangeOrderStatusRequest {
            order_id: order_id.clone(),
            status,
            reason: None,
        };
        let orders = self.inner.api.orders();
        let result = match actor {
            OrderActor::Consumer => orders.consumer_change_status(&request).await,
            OrderActor::Farmer => orders.farmer_change_status(&request).await,
        };

        match result {
            Ok(_) => {
                self.update_order_status(order_id, status).await;
                error::add_breadcrumb(
                    "order",
                    "Changed order status",
                    Some(&[("order_id", order_id.as_str()), ("status", status.as_str())]),
                );
                true
            }
            Err(e) => {
                self.set_error(Some(e.localized())).await;
                false
            }
        }
    }

    async fn update(&self, mutate: impl FnOnce(&mut OrderState)) {
        let mut state = self.inner.state.write().await;
        mutate(&mut state);
        super::persist(
            self.inner.storage.as_ref(),
            STORAGE_KEY,
            &PersistedOrders {
                pending_orders: state.pending_orders.clone(),
                last_created_orders: state.last_created_orders.clone(),
            },
        );
    }
}

fn fetch_error_message(e: &crate::error::ApiError) -> String {
    if e.is_network() {
        FETCH_ORDERS_FAILED.to_string()
    } else {
        e.localized()
    }
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use nongsan_core::dto::OrderItemRequest;
    use nongsan_core::{AddressId, PaymentMethod};

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn server_order(id: &str, hour: Option<u32>) -> OrderResponse {
        OrderResponse {
            id: OrderId::new(id),
            total_price: Some(Vnd::new(100_000)),
            total_quantity: Some(1),
            note: None,
            last_status_change_reason: None,
            status: OrderStatus::Pending,
            address: None,
            account: None,
            farmer: None,
            order_items: Vec::new(),
            created_at: hour.map(at),
        }
    }

    fn pending(farmer: &str, hour: u32) -> PendingOrder {
        let request = OrderRequest {
            note: String::new(),
            address_id: AddressId::new("ad1"),
            farmer_id: FarmerId::new(farmer),
            items: vec![OrderItemRequest {
                cart_item_id: CartItemId::new("ci1"),
            }],
            payment_method: PaymentMethod::Cod,
        };
        let mut order = PendingOrder::from_request(request, "HTX", Vec::new());
        order.created_at = at(hour);
        order
    }

    #[test]
    fn test_pending_order_id_shape() {
        let id = create_pending_order_id();
        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some("pending"));
        assert!(parts.next().unwrap().parse::<i64>().is_ok());
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(create_pending_order_id(), id);
    }

    #[test]
    fn test_all_current_orders_newest_first() {
        let state = OrderState {
            orders: vec![server_order("o-old", Some(8)), server_order("o-none", None)],
            pending_orders: vec![pending("f1", 10), pending("f2", 9)],
            ..OrderState::default()
        };
        let hours: Vec<_> = state
            .all_current_orders()
            .iter()
            .map(CurrentOrder::created_at)
            .collect();
        assert_eq!(hours, vec![Some(at(10)), Some(at(9)), Some(at(8)), None]);
        assert_eq!(state.total_orders(), 4);
    }

    #[test]
    fn test_pending_orders_grouped_by_farmer() {
        let state = OrderState {
            pending_orders: vec![pending("f1", 1), pending("f2", 2), pending("f1", 3)],
            ..OrderState::default()
        };
        let groups = state.pending_orders_by_farmer();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&FarmerId::new("f1")].len(), 2);
        assert_eq!(groups[&FarmerId::new("f1")][1].created_at, at(3));
    }

    #[test]
    fn test_status_update_touches_both_lists() {
        let mut state = OrderState {
            orders: vec![server_order("o1", Some(1))],
            farmer_orders: vec![server_order("o1", Some(1)), server_order("o2", Some(2))],
            ..OrderState::default()
        };
        state.set_status(&OrderId::new("o1"), OrderStatus::Canceled);
        assert_eq!(state.orders[0].status, OrderStatus::Canceled);
        assert_eq!(state.farmer_orders[0].status, OrderStatus::Canceled);
        assert_eq!(state.farmer_orders[1].status, OrderStatus::Pending);
        assert_eq!(
            state.order_by_id(&OrderId::new("o2")).unwrap().id.as_str(),
            "o2"
        );
    }

    #[test]
    fn test_pending_total_price() {
        let mut order = pending("f1", 1);
        order.items = vec![PendingOrderItem {
            cart_item_id: CartItemId::new("ci1"),
            product_name: "Sầu riêng".to_string(),
            quantity: 2,
            price: Vnd::new(150_000),
            thumbnail: None,
        }];
        assert_eq!(order.total_price(), Vnd::new(300_000));
    }
}
