//! Request and response records exchanged with the marketplace backend,
//! plus the chat and weather records of the assistant features.
//!
//! Field names follow the backend's JSON (camelCase). Response fields the
//! backend may leave `null` are `Option`s; collections default to empty.

pub mod account;
pub mod address;
pub mod auth;
pub mod cart;
pub mod category;
pub mod chat;
pub mod envelope;
pub mod farmer;
pub mod market_price;
pub mod ocop;
pub mod order;
pub mod payment;
pub mod product;
pub mod upload;
pub mod weather;

pub use account::*;
pub use address::*;
pub use auth::*;
pub use cart::*;
pub use category::*;
pub use chat::*;
pub use envelope::*;
pub use farmer::*;
pub use market_price::*;
pub use ocop::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use upload::*;
pub use weather::*;
