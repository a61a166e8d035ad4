//! Integration tests for the cart controller.

#![allow(clippy::unwrap_used)]

use nongsan_client::notify::{Toast, ToastVariant};
use nongsan_core::{CartItemId, ProductId, Vnd};
use nongsan_integration_tests::TestContext;
use tokio::sync::broadcast::Receiver;

fn next_toast(rx: &mut Receiver<Toast>) -> Toast {
    rx.try_recv().unwrap()
}

async fn logged_in_with_cart() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend.seed_cart_item("p1", "f1", 25_000, 2);
    ctx.backend.seed_cart_item("p2", "f2", 40_000, 1);
    ctx.login().await;
    ctx.app.bootstrap.stop().await;
    ctx.app.cart.fetch_cart_items().await;
    ctx
}

#[tokio::test]
async fn test_fetch_fills_store_and_totals() {
    let ctx = logged_in_with_cart().await;

    assert_eq!(ctx.app.cart.items().await.len(), 2);
    assert_eq!(ctx.app.cart.total_items().await, 3);
    assert_eq!(ctx.app.cart.total_price().await, Vnd::new(90_000));
    assert!(!ctx.app.cart.is_loading().await);
    assert!(ctx.app.cart.error().await.is_none());
}

#[tokio::test]
async fn test_fetch_while_logged_out_reports_error() {
    let ctx = TestContext::new().await;
    let mut toasts = ctx.app.notifier.subscribe();

    ctx.app.cart.fetch_cart_items().await;

    assert_eq!(
        ctx.app.cart.error().await.as_deref(),
        Some("User is not authenticated")
    );
    let toast = next_toast(&mut toasts);
    assert_eq!(toast.description, "Không thể tải giỏ hàng");
    assert_eq!(toast.variant, ToastVariant::Destructive);
}

#[tokio::test]
async fn test_add_to_cart_reloads_from_server() {
    let ctx = logged_in_with_cart().await;
    let mut toasts = ctx.app.notifier.subscribe();

    ctx.app.cart.add_to_cart(&ProductId::new("p1"), 3).await;

    // Merged server-side into the existing line.
    assert_eq!(ctx.app.cart.items().await.len(), 2);
    assert_eq!(ctx.app.cart.total_items().await, 6);
    let toast = next_toast(&mut toasts);
    assert_eq!(toast, Toast::success("Đã thêm sản phẩm vào giỏ hàng"));
}

#[tokio::test]
async fn test_add_missing_product_shows_server_message() {
    let ctx = logged_in_with_cart().await;
    let mut toasts = ctx.app.notifier.subscribe();

    ctx.app.cart.add_to_cart(&ProductId::new("p-missing"), 1).await;

    assert_eq!(next_toast(&mut toasts), Toast::error("Product not found"));
    assert_eq!(ctx.app.cart.total_items().await, 3);
}

#[tokio::test]
async fn test_update_quantity_patches_local_line() {
    let ctx = logged_in_with_cart().await;
    let id = CartItemId::new("ci-1");

    ctx.app.cart.update_quantity(&id, 5).await;
    assert_eq!(ctx.app.cart.item_by_id(&id).await.unwrap().quantity, 5);
    assert_eq!(ctx.app.cart.total_price().await, Vnd::new(165_000));

    // Zero is ignored without a request.
    let before = ctx.backend.requests_to("/api/cart-items/ci-1/quantity").len();
    ctx.app.cart.update_quantity(&id, 0).await;
    assert_eq!(
        ctx.backend.requests_to("/api/cart-items/ci-1/quantity").len(),
        before
    );
    assert_eq!(ctx.app.cart.item_by_id(&id).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn test_delete_unknown_item_keeps_cart() {
    let ctx = logged_in_with_cart().await;
    let mut toasts = ctx.app.notifier.subscribe();

    ctx.app.cart.delete_cart_item(&CartItemId::new("ci-404")).await;

    assert_eq!(ctx.app.cart.items().await.len(), 2);
    assert_eq!(
        next_toast(&mut toasts).variant,
        ToastVariant::Destructive
    );
}

#[tokio::test]
async fn test_delete_and_clear() {
    let ctx = logged_in_with_cart().await;

    ctx.app.cart.delete_cart_item(&CartItemId::new("ci-2")).await;
    assert_eq!(ctx.app.cart.items().await.len(), 1);
    assert_eq!(ctx.backend.state().cart.len(), 1);

    ctx.app.cart.clear_cart().await;
    assert!(ctx.app.cart.items().await.is_empty());
    assert!(ctx.backend.state().cart.is_empty());
    assert_eq!(ctx.app.cart.total_price().await, Vnd::ZERO);
}
