//! Integration tests for multi-farmer checkout and order status changes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use nongsan_client::checkout::group_by_farmer;
use nongsan_core::{AddressId, FarmerId, OrderActor, OrderId, OrderStatus, PaymentMethod, Vnd};
use nongsan_integration_tests::TestContext;

async fn checkout_ready(farmers: &[(&str, &str)]) -> TestContext {
    let ctx = TestContext::new().await;
    for (product, farmer) in farmers {
        ctx.backend.seed_cart_item(product, farmer, 30_000, 2);
    }
    ctx.login().await;
    ctx.app.bootstrap.stop().await;
    ctx.app.cart.fetch_cart_items().await;

    let groups = group_by_farmer(&ctx.app.cart.items().await);
    ctx.app
        .checkout
        .create_pending_orders(&groups, "Giao giờ hành chính", &AddressId::new("ad1"))
        .await;
    ctx
}

#[tokio::test]
async fn test_cart_splits_into_one_order_per_farmer() {
    let ctx = checkout_ready(&[("p1", "f1"), ("p2", "f2"), ("p3", "f1")]).await;

    let pending = ctx.app.orders.pending_orders().await;
    assert_eq!(pending.len(), 2);
    let by_farmer = ctx.app.orders.pending_orders_by_farmer().await;
    let f1 = &by_farmer[&FarmerId::new("f1")];
    assert_eq!(f1.len(), 1);
    assert_eq!(f1[0].items.len(), 2);
    assert_eq!(f1[0].total_price(), Vnd::new(120_000));
    assert_eq!(f1[0].farmer_name, "Nhà vườn f1");
}

#[tokio::test]
async fn test_submit_places_every_pending_order() {
    let ctx = checkout_ready(&[("p1", "f1"), ("p2", "f2")]).await;

    let outcome = ctx.app.checkout.submit_pending_orders(PaymentMethod::Cod).await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.created.len(), 2);
    assert!(ctx.app.orders.pending_orders().await.is_empty());
    assert_eq!(ctx.app.orders.last_created_orders().await.len(), 2);
    assert_eq!(ctx.app.orders.total_orders().await, 2);
    // The backend moved every ordered line out of the cart.
    assert!(ctx.backend.state().cart.is_empty());
    assert!(ctx.app.orders.error().await.is_none());
}

#[tokio::test]
async fn test_rejected_order_stays_pending() {
    let ctx = checkout_ready(&[("p1", "f1"), ("p2", "f-closed")]).await;

    let outcome = ctx.app.checkout.submit_pending_orders(PaymentMethod::Vnpay).await;

    assert!(!outcome.is_complete());
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].1.code.as_deref(), Some("farmer-e-02"));

    let pending = ctx.app.orders.pending_orders().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].farmer_id, FarmerId::new("f-closed"));
    assert_eq!(ctx.app.orders.last_created_orders().await.len(), 1);
    assert!(ctx.app.orders.error().await.is_some());

    // The closed farm's line is still in the server cart.
    assert_eq!(ctx.backend.state().cart.len(), 1);
}

// =============================================================================
// Order status
// =============================================================================

#[tokio::test]
async fn test_consumer_confirms_delivery() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_order("o-seed", "DELIVERED");
    ctx.login().await;
    ctx.app.bootstrap.stop().await;
    ctx.app.orders.fetch_all_orders().await;

    let id = OrderId::new("o-seed");
    assert!(
        ctx.app
            .orders
            .change_order_status(&id, OrderStatus::Received, OrderActor::Consumer)
            .await
    );
    let order = ctx.app.orders.order_by_id(&id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Received);

    // Received is final: refused locally, nothing sent.
    assert!(
        !ctx.app
            .orders
            .change_order_status(&id, OrderStatus::Canceled, OrderActor::Consumer)
            .await
    );
    assert_eq!(
        ctx.backend
            .requests_to("/api/orders/consumer/change-status")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_fetch_orders_while_logged_out_sets_error() {
    let ctx = TestContext::new().await;
    ctx.app.orders.fetch_all_orders().await;

    assert!(ctx.app.orders.error().await.is_some());
    assert_eq!(ctx.app.orders.total_orders().await, 0);
    assert!(!ctx.app.orders.snapshot().await.is_loading);
}
