//! Integration tests for store persistence across restarts.

#![allow(clippy::unwrap_used)]

use std::fs;

use nongsan_client::checkout::group_by_farmer;
use nongsan_core::{AddressId, Vnd};
use nongsan_integration_tests::TestContext;
use secrecy::ExposeSecret;
use serde_json::Value;

#[tokio::test]
async fn test_session_profile_and_cart_survive_reopen() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_cart_item("p1", "f1", 25_000, 2);
    ctx.login().await;
    ctx.app.bootstrap.stop().await;
    ctx.app.cart.fetch_cart_items().await;

    let reopened = ctx.reopen();
    let auth = reopened.auth.snapshot().await;
    assert!(auth.is_logged_in);
    assert_eq!(auth.refresh_token.unwrap().expose_secret(), "refresh-1");
    assert_eq!(
        reopened.user.user().await.email.as_deref(),
        Some("lan@nongsan.vn")
    );
    assert_eq!(reopened.cart.total_price().await, Vnd::new(50_000));
    // Flags are not persisted.
    assert!(!reopened.cart.is_loading().await);
}

#[tokio::test]
async fn test_pending_orders_survive_reopen_but_fetched_orders_do_not() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_cart_item("p1", "f1", 25_000, 1);
    ctx.backend.seed_order("o-old", "PENDING");
    ctx.login().await;
    ctx.app.bootstrap.stop().await;
    ctx.app.cart.fetch_cart_items().await;
    ctx.app.orders.fetch_all_orders().await;

    let groups = group_by_farmer(&ctx.app.cart.items().await);
    ctx.app
        .checkout
        .create_pending_orders(&groups, "", &AddressId::new("ad1"))
        .await;

    let reopened = ctx.reopen();
    let state = reopened.orders.snapshot().await;
    assert_eq!(state.pending_orders.len(), 1);
    assert!(state.pending_orders[0].temp_id.starts_with("pending_"));
    assert!(state.orders.is_empty());
}

#[tokio::test]
async fn test_store_documents_use_versioned_layout() {
    let ctx = TestContext::new().await;
    ctx.app.auth.set_redirect("/cart").await;

    let raw = fs::read_to_string(ctx.dir.path().join("auth-storage.json")).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 0);
    assert_eq!(doc["state"]["redirect"], "/cart");
    assert_eq!(doc["state"]["isLoggedIn"], false);
}

#[tokio::test]
async fn test_corrupt_document_starts_fresh() {
    let ctx = TestContext::new().await;
    fs::write(ctx.dir.path().join("cart-storage.json"), "{not json").unwrap();

    let reopened = ctx.reopen();
    assert!(reopened.cart.items().await.is_empty());
}
