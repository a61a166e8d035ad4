//! Cart and checkout commands.

use nongsan_client::Nongsan;
use nongsan_client::checkout::group_by_farmer;
use nongsan_core::{AddressId, CartItemId, PaymentMethod, ProductId};

use super::{CommandError, drain_toasts, out};

pub async fn list(app: &Nongsan) {
    let mut toasts = app.notifier.subscribe();
    app.cart.fetch_cart_items().await;
    drain_toasts(&mut toasts);

    let items = app.cart.items().await;
    if items.is_empty() {
        out("Giỏ hàng trống");
        return;
    }
    for item in &items {
        let name = item.product.as_ref().map_or("-", |p| p.name.as_str());
        let line_total = item.line_total().map(|t| t.to_string()).unwrap_or_default();
        out(format!("{}  {} x{}  {}", item.id, name, item.quantity, line_total));
    }
    out(format!(
        "-- {} sản phẩm, tổng {}",
        app.cart.total_items().await,
        app.cart.total_price().await
    ));
}

pub async fn add(app: &Nongsan, product_id: &str, quantity: u32) {
    let mut toasts = app.notifier.subscribe();
    app.cart
        .add_to_cart(&ProductId::new(product_id), quantity)
        .await;
    drain_toasts(&mut toasts);
}

pub async fn set_quantity(app: &Nongsan, cart_item_id: &str, quantity: u32) {
    let mut toasts = app.notifier.subscribe();
    app.cart
        .update_quantity(&CartItemId::new(cart_item_id), quantity)
        .await;
    drain_toasts(&mut toasts);
}

pub async fn remove(app: &Nongsan, cart_item_id: &str) {
    let mut toasts = app.notifier.subscribe();
    app.cart
        .delete_cart_item(&CartItemId::new(cart_item_id))
        .await;
    drain_toasts(&mut toasts);
}

pub async fn clear(app: &Nongsan) {
    let mut toasts = app.notifier.subscribe();
    app.cart.clear_cart().await;
    drain_toasts(&mut toasts);
}

/// Place the pending orders, building them from the cart first when none
/// are left over from an earlier attempt.
pub async fn checkout(
    app: &Nongsan,
    address_id: &str,
    note: &str,
    payment_method: PaymentMethod,
) -> Result<(), CommandError> {
    if !app.auth.is_logged_in().await {
        return Err(CommandError::NotLoggedIn);
    }

    if app.orders.pending_orders().await.is_empty() {
        app.cart.fetch_cart_items().await;
        let groups = group_by_farmer(&app.cart.items().await);
        if groups.is_empty() {
            out("Giỏ hàng trống");
            return Ok(());
        }
        app.checkout
            .create_pending_orders(&groups, note, &AddressId::new(address_id))
            .await;
    } else {
        tracing::info!("Retrying pending orders from an earlier checkout");
    }

    let outcome = app.checkout.submit_pending_orders(payment_method).await;
    for order in &outcome.created {
        out(format!(
            "Đã đặt đơn {}  {}",
            order.id,
            order.total_price.map(|p| p.to_string()).unwrap_or_default()
        ));
        if payment_method == PaymentMethod::Vnpay {
            let payment = app.api.payments().create(&order.id).await?;
            out(format!("  Thanh toán: {}", payment.payment_url));
        }
    }
    for (temp_id, error) in &outcome.failed {
        out(format!("Không thể đặt {temp_id}: {}", error.localized()));
    }

    // The backend removed the ordered lines from the cart.
    app.cart.fetch_cart_items().await;

    if outcome.is_complete() {
        Ok(())
    } else {
        Err(CommandError::Incomplete(outcome.failed.len()))
    }
}
