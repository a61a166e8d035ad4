//! Admin commands: OCOP review and moderation.

use nongsan_client::Nongsan;
use nongsan_core::{FarmerId, FarmerStatus, ProductId, ProductStatus};

use super::{CommandError, out};

pub async fn ocop_list(app: &Nongsan) -> Result<(), CommandError> {
    for product in app.api.admin_ocop().list().await? {
        let Some(ocop) = &product.ocop else {
            continue;
        };
        out(format!(
            "{}  {}  {} sao  {}  {}",
            product.id,
            product.name,
            ocop.star.unwrap_or_default(),
            ocop.certificate_number.as_deref().unwrap_or("-"),
            ocop.status
        ));
    }
    Ok(())
}

pub async fn ocop_approve(app: &Nongsan, product_id: &str) -> Result<(), CommandError> {
    let product = app
        .api
        .admin_ocop()
        .approve(&ProductId::new(product_id))
        .await?;
    tracing::info!(product_id, "OCOP certificate approved");
    out(format!("Đã duyệt OCOP: {}", product.name));
    Ok(())
}

pub async fn ocop_reject(app: &Nongsan, product_id: &str, reason: &str) -> Result<(), CommandError> {
    let product = app
        .api
        .admin_ocop()
        .reject(&ProductId::new(product_id), reason)
        .await?;
    tracing::info!(product_id, reason, "OCOP certificate rejected");
    out(format!("Đã từ chối OCOP: {}", product.name));
    Ok(())
}

pub async fn product_status(
    app: &Nongsan,
    product_id: &str,
    status: ProductStatus,
) -> Result<(), CommandError> {
    let product = app
        .api
        .products()
        .admin_change_status(&ProductId::new(product_id), status)
        .await?;
    out(format!(
        "{}: {}",
        product.name,
        product.status.unwrap_or(status)
    ));
    Ok(())
}

pub async fn farmer_status(
    app: &Nongsan,
    farmer_id: &str,
    status: FarmerStatus,
) -> Result<(), CommandError> {
    let farmer = app
        .api
        .farmers()
        .change_status(&FarmerId::new(farmer_id), status)
        .await?;
    out(format!(
        "{}: {}",
        farmer.name.as_deref().unwrap_or(farmer_id),
        farmer.status
    ));
    Ok(())
}
