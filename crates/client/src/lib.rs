//! Nông Sản Client - headless marketplace client.
//!
//! Talks to the marketplace REST backend and keeps the client-side state a
//! browser front end would: tokens, the signed-in profile, the cart and
//! orders, each persisted to a local state directory.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] wraps `reqwest` with bearer auth, request IDs and
//!   envelope decoding; a 401/403 clears the stored tokens
//! - [`services`] exposes one typed accessor per backend area
//! - [`stores`] are cloneable handles over `tokio::sync::RwLock` state,
//!   written through a [`storage::Storage`] after every mutation
//! - [`cart::Cart`] and [`checkout::Checkout`] drive the stores from user
//!   actions and emit [`notify::Toast`]s
//! - [`session::Bootstrap`] refreshes the access token on start and on a
//!   timer
//! - [`chatbot::ChatbotClient`] and [`weather::WeatherClient`] talk to
//!   Gemini and OpenWeather for the AgriBot assistant and the weather page
//!
//! # Example
//!
//! ```rust,ignore
//! use nongsan_client::{ClientConfig, Nongsan};
//!
//! let nongsan = Nongsan::open(ClientConfig::from_env()?)?;
//! nongsan.bootstrap.start().await;
//! nongsan.cart.fetch_cart_items().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod chatbot;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod services;
pub mod session;
pub mod storage;
pub mod stores;
pub mod weather;

use std::sync::Arc;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ClientError};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use cart::Cart;
use chatbot::ChatbotClient;
use checkout::Checkout;
use notify::Notifier;
use session::Bootstrap;
use stores::{AuthStore, CartStore, OrderStore, UserStore};
use weather::WeatherClient;

/// Every store, controller and the API client, wired together.
#[derive(Clone)]
pub struct Nongsan {
    pub api: ApiClient,
    pub auth: AuthStore,
    pub user: UserStore,
    pub cart_store: CartStore,
    pub orders: OrderStore,
    pub cart: Cart,
    pub checkout: Checkout,
    pub bootstrap: Bootstrap,
    pub notifier: Notifier,
    pub chatbot: ChatbotClient,
    pub weather: WeatherClient,
}

impl Nongsan {
    /// Wire the client over file storage in `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn open(config: ClientConfig) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.state_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Wire the client over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ClientError> {
        let auth = AuthStore::load(Arc::clone(&storage));
        let api = ApiClient::new(&config, auth.clone())?;
        let chatbot = ChatbotClient::new(&config)?;
        let weather = WeatherClient::new(&config)?;
        let user = UserStore::load(Arc::clone(&storage), api.clone());
        let cart_store = CartStore::load(Arc::clone(&storage));
        let orders = OrderStore::load(storage, api.clone());
        let notifier = Notifier::new();
        let cart = Cart::new(api.clone(), cart_store.clone(), notifier.clone());
        let checkout = Checkout::new(api.clone(), orders.clone());
        let bootstrap = Bootstrap::new(
            api.clone(),
            auth.clone(),
            user.clone(),
            cart_store.clone(),
            config.refresh_interval(),
        );

        Ok(Self {
            api,
            auth,
            user,
            cart_store,
            orders,
            cart,
            checkout,
            bootstrap,
            notifier,
            chatbot,
            weather,
        })
    }
}
