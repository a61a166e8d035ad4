//! Order and address commands.

use nongsan_client::Nongsan;
use nongsan_client::stores::CurrentOrder;
use nongsan_core::{OrderActor, OrderId, OrderStatus};

use super::{CommandError, out};

pub async fn list(app: &Nongsan) -> Result<(), CommandError> {
    app.orders.fetch_all_orders().await;
    if let Some(error) = app.orders.error().await {
        out(format!("Lỗi: {error}"));
    }

    for order in app.orders.all_current_orders().await {
        match order {
            CurrentOrder::Confirmed(order) => out(format!(
                "{}  {}  {}  {}",
                order.id,
                order.status,
                order
                    .farmer
                    .as_ref()
                    .and_then(|f| f.name.as_deref())
                    .unwrap_or("-"),
                order.total_price.map(|p| p.to_string()).unwrap_or_default()
            )),
            CurrentOrder::Pending(order) => out(format!(
                "{}  CHỜ GỬI  {}  {}",
                order.temp_id,
                order.farmer_name,
                order.total_price()
            )),
        }
    }
    out(format!("-- {} đơn hàng", app.orders.total_orders().await));
    Ok(())
}

pub async fn farmer(app: &Nongsan) -> Result<(), CommandError> {
    app.orders.fetch_farmer_orders().await;
    if let Some(error) = app.orders.error().await {
        out(format!("Lỗi: {error}"));
    }

    for order in app.orders.snapshot().await.farmer_orders {
        let buyer = order
            .account
            .as_ref()
            .map_or("-", |account| account.email.as_str());
        out(format!(
            "{}  {}  {}  {}",
            order.id,
            order.status,
            buyer,
            order.total_price.map(|p| p.to_string()).unwrap_or_default()
        ));
    }
    Ok(())
}

pub async fn change_status(
    app: &Nongsan,
    order_id: &str,
    status: OrderStatus,
    as_farmer: bool,
) -> Result<(), CommandError> {
    let actor = if as_farmer {
        OrderActor::Farmer
    } else {
        OrderActor::Consumer
    };
    let order_id = OrderId::new(order_id);

    // Load the lists so the local transition check knows the order.
    match actor {
        OrderActor::Consumer => app.orders.fetch_all_orders().await,
        OrderActor::Farmer => app.orders.fetch_farmer_orders().await,
    }

    if app.orders.change_order_status(&order_id, status, actor).await {
        out(format!("Đơn {order_id}: {status}"));
    } else {
        let reason = app.orders.error().await.unwrap_or_default();
        out(format!("Không thể cập nhật đơn {order_id}: {reason}"));
    }
    Ok(())
}

pub async fn addresses(app: &Nongsan) -> Result<(), CommandError> {
    for address in app.api.addresses().list().await? {
        let default = if address.is_default.unwrap_or(false) {
            " (mặc định)"
        } else {
            ""
        };
        out(format!(
            "{}  {} {}{}\n    {}",
            address.id,
            address.receiver_name.as_deref().unwrap_or("-"),
            address.receiver_phone.as_deref().unwrap_or(""),
            default,
            address.one_line()
        ));
    }
    Ok(())
}
