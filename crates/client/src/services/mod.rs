//! Typed REST services, one per backend area.
//!
//! Each area is reached through an accessor on [`ApiClient`], so calls read
//! `api.cart_items().list()`. Every call returns `Result<T, ApiError>`.
//!
//! [`ApiClient`]: crate::api::ApiClient

pub mod account;
pub mod address;
pub mod admin_ocop;
pub mod auth;
pub mod cart_item;
pub mod category;
pub mod farmer;
pub mod market_price;
pub mod order;
pub mod payment;
pub mod product;
pub mod upload;

pub use account::AccountApi;
pub use address::AddressApi;
pub use admin_ocop::AdminOcopApi;
pub use auth::AuthApi;
pub use cart_item::CartItemApi;
pub use category::CategoryApi;
pub use farmer::FarmerApi;
pub use market_price::MarketPriceApi;
pub use order::OrderApi;
pub use payment::PaymentApi;
pub use product::ProductApi;
pub use upload::UploadApi;
