//! Catalog commands: products, categories and market prices.

use nongsan_client::Nongsan;
use nongsan_core::ProductId;
use nongsan_core::dto::{CategoryTreeNode, PageRequest};
use nongsan_core::validation::MarketPriceForm;

use super::{CommandError, out};

pub async fn list_products(app: &Nongsan, page: u32, size: u32) -> Result<(), CommandError> {
    let products = app.api.products().list(PageRequest { page, size }).await?;
    for product in &products.content {
        let badge = if product.is_ocop_verified() { " [OCOP]" } else { "" };
        out(format!(
            "{}  {}{}  {}",
            product.id,
            product.name,
            badge,
            product.price.map(|p| p.to_string()).unwrap_or_default()
        ));
    }
    out(format!(
        "-- page {}/{} ({} products)",
        products.page + 1,
        products.total_pages.max(1),
        products.total_elements
    ));
    Ok(())
}

pub async fn show_product(app: &Nongsan, id: &str) -> Result<(), CommandError> {
    let product = app.api.products().get(&ProductId::new(id)).await?;
    out(&product.name);
    if let Some(price) = product.price {
        let unit = product.unit_price.as_deref().unwrap_or("");
        out(format!("  giá:      {price} / {unit}"));
    }
    if let Some(inventory) = product.inventory {
        out(format!("  tồn kho:  {inventory}"));
    }
    if let Some(farmer) = &product.farmer {
        out(format!(
            "  nhà vườn: {}",
            farmer.name.as_deref().unwrap_or(farmer.id.as_str())
        ));
    }
    if let Some(ocop) = &product.ocop {
        out(format!(
            "  OCOP:     {} sao ({})",
            ocop.star.unwrap_or_default(),
            ocop.status
        ));
    }
    if let Some(description) = &product.description {
        out(format!("\n{description}"));
    }
    Ok(())
}

pub async fn categories(app: &Nongsan) -> Result<(), CommandError> {
    for root in app.api.categories().tree().await? {
        print_tree(&root, 0);
    }
    Ok(())
}

fn print_tree(node: &CategoryTreeNode, depth: usize) {
    out(format!("{}{} ({})", "  ".repeat(depth), node.name, node.id));
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

pub async fn list_prices(app: &Nongsan) -> Result<(), CommandError> {
    for price in app.api.market_prices().list().await? {
        let product = price
            .product
            .as_ref()
            .map_or("-", |product| product.name.as_str());
        out(format!(
            "{}  {}  {}  {}",
            price.date_recorded, price.region, product, price.price
        ));
    }
    Ok(())
}

pub async fn add_price(
    app: &Nongsan,
    product_id: String,
    price: String,
    region: String,
    date_recorded: String,
) -> Result<(), CommandError> {
    let request = MarketPriceForm {
        product_id,
        price,
        region,
        date_recorded,
    }
    .validate()?;
    let created = app.api.market_prices().create(&request).await?;
    out(format!("Đã ghi nhận giá {} ({})", created.price, created.id));
    Ok(())
}
