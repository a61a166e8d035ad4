//! Nông Sản CLI - headless marketplace client.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as a consumer
//! nongsan login -e lan@nongsan.vn -p matkhau123
//!
//! # Browse and buy
//! nongsan products list --page 0 --size 20
//! nongsan cart add <product-id> -q 2
//! nongsan checkout --address <address-id> --payment vnpay
//!
//! # Ask the assistant, check the weather
//! nongsan chat "Lúa bị vàng lá thì bón gì?"
//! nongsan weather forecast "Cần Thơ"
//!
//! # Keep the session fresh until Ctrl+C
//! nongsan run
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `refresh`, `register` - Session
//! - `products`, `categories`, `prices` - Catalog
//! - `cart`, `checkout`, `orders`, `addresses` - Buying and selling
//! - `admin` - OCOP review and moderation
//! - `chat`, `weather` - AgriBot assistant and OpenWeather lookups
//! - `run` - Bootstrap, then refresh the token on a timer

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use nongsan_client::{ClientConfig, Nongsan};
use nongsan_core::dto::Coord;
use nongsan_core::{FarmerStatus, OrderStatus, PaymentMethod, ProductStatus, Role};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "nongsan")]
#[command(author, version, about = "Nông Sản marketplace client")]
struct Cli {
    /// Backend base URL (overrides `NONGSAN_SERVER_URL`)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the tokens
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Role to sign in as
        #[arg(short, long, value_enum, default_value_t = RoleArg::Consumer)]
        role: RoleArg,
    },
    /// Revoke the session and clear local state
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Refresh the access token now
    Refresh,
    /// Create an account; a verification link is emailed
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Show the category tree
    Categories,
    /// Market price observations
    Prices {
        #[command(subcommand)]
        action: PriceAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Split the cart into one order per farmer and place them
    Checkout {
        /// Delivery address ID
        #[arg(short, long)]
        address: String,

        #[arg(short, long, default_value = "")]
        note: String,

        #[arg(long, value_enum, default_value_t = PaymentArg::Cod)]
        payment: PaymentArg,
    },
    /// List and update orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Delivery addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Ask AgriBot; without a message, chat line by line on stdin
    Chat { message: Option<String> },
    /// Weather in Vietnam
    Weather {
        #[command(subcommand)]
        action: WeatherAction,
    },
    /// Bootstrap the session and keep refreshing until Ctrl+C
    Run,
}

#[derive(Subcommand)]
enum ProductAction {
    /// One page of active products
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Product detail
    Show { id: String },
}

#[derive(Subcommand)]
enum PriceAction {
    /// All recorded prices
    List,
    /// Record a price observation
    Add {
        #[arg(long)]
        product: String,

        /// Price in đồng
        #[arg(long)]
        price: String,

        #[arg(long)]
        region: String,

        /// Observation date, `YYYY-MM-DD`
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand)]
enum WeatherAction {
    /// Current conditions in a city or at a coordinate
    Now {
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Find a city's coordinates
    City { name: String },
    /// Five-day forecast for a city
    Forecast { city: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    List,
    /// Add a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity
    Set { cart_item_id: String, quantity: u32 },
    /// Remove a line
    Remove { cart_item_id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Your orders, including pending ones
    List,
    /// Orders placed with your farm
    Farmer,
    /// Change an order's status
    Status {
        order_id: String,

        #[arg(value_enum)]
        status: OrderStatusArg,

        /// Act as the selling farmer instead of the buyer
        #[arg(long)]
        as_farmer: bool,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// Your delivery addresses
    List,
}

#[derive(Subcommand)]
enum AdminAction {
    /// OCOP certificate review
    Ocop {
        #[command(subcommand)]
        action: OcopAction,
    },
    /// Product moderation
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// Farm moderation
    Farmers {
        #[command(subcommand)]
        action: AdminFarmerAction,
    },
}

#[derive(Subcommand)]
enum OcopAction {
    /// Products with a certificate attached
    List,
    /// Approve a product's certificate
    Approve { product_id: String },
    /// Reject a product's certificate
    Reject {
        product_id: String,

        #[arg(short, long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum AdminProductAction {
    /// Set a product's listing status
    Status {
        product_id: String,

        #[arg(value_enum)]
        status: ProductStatusArg,
    },
}

#[derive(Subcommand)]
enum AdminFarmerAction {
    /// Set a farm's status
    Status {
        farmer_id: String,

        #[arg(value_enum)]
        status: FarmerStatusArg,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument enums
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Consumer,
    Farmer,
    Admin,
    Specialist,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Consumer => Self::Consumer,
            RoleArg::Farmer => Self::Farmer,
            RoleArg::Admin => Self::Admin,
            RoleArg::Specialist => Self::Specialist,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PaymentArg {
    Cod,
    Vnpay,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cod => Self::Cod,
            PaymentArg::Vnpay => Self::Vnpay,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderStatusArg {
    Confirmed,
    Delivering,
    Delivered,
    Received,
    Canceled,
}

impl From<OrderStatusArg> for OrderStatus {
    fn from(arg: OrderStatusArg) -> Self {
        match arg {
            OrderStatusArg::Confirmed => Self::Confirmed,
            OrderStatusArg::Delivering => Self::Delivering,
            OrderStatusArg::Delivered => Self::Delivered,
            OrderStatusArg::Received => Self::Received,
            OrderStatusArg::Canceled => Self::Canceled,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ProductStatusArg {
    Active,
    Blocked,
    Rejected,
}

impl From<ProductStatusArg> for ProductStatus {
    fn from(arg: ProductStatusArg) -> Self {
        match arg {
            ProductStatusArg::Active => Self::Active,
            ProductStatusArg::Blocked => Self::Blocked,
            ProductStatusArg::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FarmerStatusArg {
    Active,
    SelfBlock,
    AdminBlock,
}

impl From<FarmerStatusArg> for FarmerStatus {
    fn from(arg: FarmerStatusArg) -> Self {
        match arg {
            FarmerStatusArg::Active => Self::Active,
            FarmerStatusArg::SelfBlock => Self::SelfBlock,
            FarmerStatusArg::AdminBlock => Self::AdminBlock,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup
// ─────────────────────────────────────────────────────────────────────────────

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn load_config(server: Option<&str>) -> Result<ClientConfig, CommandError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(server) = server {
        config.server_url = ClientConfig::for_server(server)?.server_url;
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.server.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry before the subscriber, so the layer sees an active client
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nongsan_client=info,nongsan_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), CommandError> {
    let app = Nongsan::open(config)?;

    match command {
        Commands::Login {
            email,
            password,
            role,
        } => commands::session::login(&app, &email, &password, role.into()).await?,
        Commands::Logout => commands::session::logout(&app).await,
        Commands::Whoami => commands::session::whoami(&app).await?,
        Commands::Refresh => commands::session::refresh(&app).await?,
        Commands::Register {
            email,
            password,
            confirm,
        } => commands::session::register(&app, &email, &password, &confirm).await?,
        Commands::Run => commands::session::run(&app).await?,

        Commands::Products { action } => match action {
            ProductAction::List { page, size } => {
                commands::catalog::list_products(&app, page, size).await?;
            }
            ProductAction::Show { id } => commands::catalog::show_product(&app, &id).await?,
        },
        Commands::Categories => commands::catalog::categories(&app).await?,
        Commands::Prices { action } => match action {
            PriceAction::List => commands::catalog::list_prices(&app).await?,
            PriceAction::Add {
                product,
                price,
                region,
                date,
            } => commands::catalog::add_price(&app, product, price, region, date).await?,
        },

        Commands::Chat { message } => commands::assistant::chat(&app, message.as_deref()).await?,
        Commands::Weather { action } => match action {
            WeatherAction::Now { city, lat, lon } => {
                let coord = lat.zip(lon).map(|(lat, lon)| Coord { lat, lon });
                commands::assistant::now(&app, city.as_deref(), coord).await?;
            }
            WeatherAction::City { name } => commands::assistant::city(&app, &name).await?,
            WeatherAction::Forecast { city } => commands::assistant::forecast(&app, &city).await?,
        },

        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&app).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&app, &product_id, quantity).await,
            CartAction::Set {
                cart_item_id,
                quantity,
            } => commands::cart::set_quantity(&app, &cart_item_id, quantity).await,
            CartAction::Remove { cart_item_id } => {
                commands::cart::remove(&app, &cart_item_id).await;
            }
            CartAction::Clear => commands::cart::clear(&app).await,
        },
        Commands::Checkout {
            address,
            note,
            payment,
        } => commands::cart::checkout(&app, &address, &note, payment.into()).await?,

        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&app).await?,
            OrderAction::Farmer => commands::orders::farmer(&app).await?,
            OrderAction::Status {
                order_id,
                status,
                as_farmer,
            } => commands::orders::change_status(&app, &order_id, status.into(), as_farmer).await?,
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::orders::addresses(&app).await?,
        },

        Commands::Admin { action } => match action {
            AdminAction::Ocop { action } => match action {
                OcopAction::List => commands::admin::ocop_list(&app).await?,
                OcopAction::Approve { product_id } => {
                    commands::admin::ocop_approve(&app, &product_id).await?;
                }
                OcopAction::Reject { product_id, reason } => {
                    commands::admin::ocop_reject(&app, &product_id, &reason).await?;
                }
            },
            AdminAction::Products {
                action: AdminProductAction::Status { product_id, status },
            } => commands::admin::product_status(&app, &product_id, status.into()).await?,
            AdminAction::Farmers {
                action: AdminFarmerAction::Status { farmer_id, status },
            } => commands::admin::farmer_status(&app, &farmer_id, status.into()).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_weather_now_reads_coordinates() {
        let cli = Cli::try_parse_from(["nongsan", "weather", "now", "--lat", "10.03", "--lon", "105.78"])
            .unwrap();
        let Commands::Weather {
            action: WeatherAction::Now { city, lat, lon },
        } = cli.command
        else {
            panic!("expected weather now");
        };
        assert!(city.is_none());
        assert!(lat.zip(lon).is_some());

        // Latitude alone is not a place.
        assert!(Cli::try_parse_from(["nongsan", "weather", "now", "--lat", "10.03"]).is_err());
    }

    #[test]
    fn test_chat_message_is_optional() {
        let cli = Cli::try_parse_from(["nongsan", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { message: None }));
    }
}
