//! Integration test harness for the Nông Sản client.
//!
//! [`FakeBackend`] is an `axum` app speaking the marketplace's envelope
//! format, bound to an ephemeral port. [`TestContext`] wires a real
//! [`Nongsan`] client to it over file storage in a temporary directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nongsan-integration-tests
//! ```
//!
//! # Fixtures
//!
//! - Password `matkhau123` logs in; anything else fails with `auth-e-04`
//! - Refresh token `refresh-1` is valid; access tokens look like `access-N`
//! - Product `p-missing` does not exist; farmer `f-closed` rejects orders
//! - The same server answers as Gemini and OpenWeather; Huế is the only
//!   city it knows

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use nongsan_client::{ClientConfig, FileStorage, Nongsan};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Password the fake backend accepts.
pub const PASSWORD: &str = "matkhau123";
/// Refresh token the fake backend accepts.
pub const REFRESH_TOKEN: &str = "refresh-1";
/// Gemini key the fake backend accepts.
pub const GEMINI_KEY: &str = "gemini-key";
/// OpenWeather key the fake backend accepts.
pub const OPENWEATHER_KEY: &str = "openweather-key";

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub cart: Vec<Value>,
    pub orders: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    pub product_list_hits: u32,
    pub refresh_calls: u32,
    pub logout_calls: u32,
    /// Bodies sent to the Gemini endpoint.
    pub chat_requests: Vec<Value>,
    next_id: u32,
}

impl BackendState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// The marketplace backend, faked.
pub struct FakeBackend {
    pub url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    /// Serve on `127.0.0.1` with an OS-assigned port.
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend crashed");
        });

        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("Backend state poisoned")
    }

    /// Requests made to `path`, oldest first.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Put a product line straight into the server-side cart.
    pub fn seed_cart_item(&self, product_id: &str, farmer_id: &str, price: i64, quantity: u32) {
        let mut state = self.state();
        let id = state.next_id();
        state.cart.push(json!({
            "id": format!("ci-{id}"),
            "quantity": quantity,
            "product": product(product_id, farmer_id, price),
            "createdAt": "2024-06-01T08:00:00"
        }));
    }

    /// Put an order straight into the consumer's order list.
    pub fn seed_order(&self, id: &str, status: &str) {
        self.state().orders.push(json!({
            "id": id,
            "totalPrice": 50_000,
            "totalQuantity": 1,
            "note": "",
            "status": status,
            "farmer": { "id": "f1", "name": "Vườn Xoài Cát" },
            "orderItems": [],
            "createdAt": "2024-06-01T09:00:00"
        }));
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A client wired to a fresh fake backend with its own state directory.
pub struct TestContext {
    pub backend: FakeBackend,
    pub app: Nongsan,
    pub config: ClientConfig,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestContext::new`], with the config adjusted before the
    /// client is opened.
    pub async fn with_config(adjust: impl FnOnce(&mut ClientConfig)) -> Self {
        let backend = FakeBackend::start().await;
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = ClientConfig::for_server(&backend.url).expect("Invalid backend URL");
        config.state_dir = dir.path().to_path_buf();
        config.gemini_url = config.server_url.clone();
        config.gemini_api_key = Some(SecretString::from(GEMINI_KEY));
        config.openweather_url = config.server_url.clone();
        config.openweather_api_key = Some(SecretString::from(OPENWEATHER_KEY));
        adjust(&mut config);
        let app = Nongsan::open(config.clone()).expect("Failed to open client");
        Self {
            backend,
            app,
            config,
            dir,
        }
    }

    /// Sign in through the backend.
    pub async fn login(&self) {
        let request = nongsan_core::validation::login(
            "lan@nongsan.vn",
            PASSWORD,
            nongsan_core::Role::Consumer,
        )
        .expect("Fixture credentials are valid");
        self.app.bootstrap.login(&request).await.expect("Login failed");
    }

    /// A second client over the same state directory, as after a restart.
    pub fn reopen(&self) -> Nongsan {
        let storage = FileStorage::open(self.dir.path()).expect("Failed to reopen storage");
        Nongsan::with_storage(self.config.clone(), Arc::new(storage)).expect("Failed to reopen")
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/info", get(info))
        .route("/api/cart-items", get(list_cart).post(add_cart_item))
        .route("/api/cart-items/clear", delete(clear_cart))
        .route("/api/cart-items/{id}", delete(delete_cart_item))
        .route("/api/cart-items/{id}/quantity", put(update_quantity))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/consumer/change-status", post(consumer_change_status))
        .route("/api/products", get(list_products))
        .route("/api/broken", get(broken))
        .route("/v1beta/models/{model}", post(generate_content))
        .route("/geo/1.0/direct", get(geocode))
        .route("/data/2.5/weather", get(current_weather))
        .route("/data/2.5/forecast", get(forecast))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: header_value(request.headers(), "authorization"),
        request_id: header_value(request.headers(), "x-request-id"),
    };
    state.lock().expect("Backend state poisoned").requests.push(recorded);
    next.run(request).await
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn ok(data: Value) -> Response {
    Json(json!({ "code": "success", "message": "OK", "data": data })).into_response()
}

fn fail(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "code": code, "message": message, "data": null })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    fail(StatusCode::UNAUTHORIZED, "auth-e-00", "User is not authenticated")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer access-"))
}

fn product(id: &str, farmer_id: &str, price: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Sản phẩm {id}"),
        "price": price,
        "thumbnail": format!("https://cdn.nongsan.vn/{id}.jpg"),
        "unitPrice": "kg",
        "status": "ACTIVE",
        "farmer": { "id": farmer_id, "name": format!("Nhà vườn {farmer_id}") }
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.password == PASSWORD {
        ok(json!({ "accessToken": "access-1", "refreshToken": REFRESH_TOKEN }))
    } else {
        fail(StatusCode::BAD_REQUEST, "auth-e-04", "Wrong password")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

async fn refresh_token(State(state): State<Shared>, Json(body): Json<RefreshBody>) -> Response {
    let mut state = state.lock().expect("Backend state poisoned");
    state.refresh_calls += 1;
    if body.refresh_token == REFRESH_TOKEN {
        let n = state.refresh_calls + 1;
        ok(json!({ "accessToken": format!("access-{n}") }))
    } else {
        fail(StatusCode::BAD_REQUEST, "jwt-e-01", "Invalid refresh token")
    }
}

async fn logout(State(state): State<Shared>) -> Response {
    state.lock().expect("Backend state poisoned").logout_calls += 1;
    ok(Value::Null)
}

async fn info(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "id": "a1",
        "displayName": "Lan",
        "email": "lan@nongsan.vn",
        "avatar": null,
        "roles": ["CONSUMER"]
    }))
}

async fn list_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(Value::Array(state.lock().expect("Backend state poisoned").cart.clone()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemBody {
    product_id: String,
    quantity: u32,
}

async fn add_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CartItemBody>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body.product_id == "p-missing" {
        return fail(StatusCode::NOT_FOUND, "product-e-01", "Product not found");
    }
    let mut state = state.lock().expect("Backend state poisoned");
    let existing = state
        .cart
        .iter_mut()
        .find(|item| item["product"]["id"] == body.product_id.as_str());
    if let Some(item) = existing {
        let quantity = item["quantity"].as_u64().unwrap_or(0) + u64::from(body.quantity);
        item["quantity"] = json!(quantity);
        return ok(item.clone());
    }
    let id = state.next_id();
    let item = json!({
        "id": format!("ci-{id}"),
        "quantity": body.quantity,
        "product": product(&body.product_id, "f1", 25_000),
        "createdAt": "2024-06-01T08:00:00"
    });
    state.cart.push(item.clone());
    ok(item)
}

#[derive(Deserialize)]
struct QuantityQuery {
    quantity: u32,
}

async fn update_quantity(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(query): Query<QuantityQuery>,
) -> Response {
    let mut state = state.lock().expect("Backend state poisoned");
    match state.cart.iter_mut().find(|item| item["id"] == id.as_str()) {
        Some(item) => {
            item["quantity"] = json!(query.quantity);
            ok(item.clone())
        }
        None => fail(StatusCode::NOT_FOUND, "cart-item-e-01", "Cart item not found"),
    }
}

async fn delete_cart_item(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().expect("Backend state poisoned");
    let before = state.cart.len();
    state.cart.retain(|item| item["id"] != id.as_str());
    if state.cart.len() == before {
        return fail(StatusCode::NOT_FOUND, "cart-item-e-01", "Cart item not found");
    }
    ok(Value::Null)
}

async fn clear_cart(State(state): State<Shared>) -> Response {
    state.lock().expect("Backend state poisoned").cart.clear();
    ok(Value::Null)
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(Value::Array(state.lock().expect("Backend state poisoned").orders.clone()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    note: String,
    farmer_id: String,
    items: Vec<OrderItemBody>,
    payment_method: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemBody {
    cart_item_id: String,
}

async fn create_order(State(state): State<Shared>, Json(body): Json<OrderBody>) -> Response {
    if body.farmer_id == "f-closed" {
        return fail(StatusCode::BAD_REQUEST, "farmer-e-02", "Farmer is not accepting orders");
    }
    let mut state = state.lock().expect("Backend state poisoned");
    let ordered: Vec<&str> = body.items.iter().map(|i| i.cart_item_id.as_str()).collect();
    let (lines, rest): (Vec<Value>, Vec<Value>) = state
        .cart
        .drain(..)
        .partition(|item| item["id"].as_str().is_some_and(|id| ordered.contains(&id)));
    state.cart = rest;

    let total: i64 = lines
        .iter()
        .map(|item| {
            item["product"]["price"].as_i64().unwrap_or(0) * item["quantity"].as_i64().unwrap_or(0)
        })
        .sum();
    let id = state.next_id();
    let order = json!({
        "id": format!("o-{id}"),
        "totalPrice": total,
        "totalQuantity": lines.len(),
        "note": body.note,
        "status": "PENDING",
        "paymentMethod": body.payment_method,
        "farmer": { "id": body.farmer_id, "name": null },
        "orderItems": [],
        "createdAt": "2024-06-02T10:00:00"
    });
    state.orders.push(order.clone());
    ok(order)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeStatusBody {
    order_id: String,
    status: String,
}

async fn consumer_change_status(
    State(state): State<Shared>,
    Json(body): Json<ChangeStatusBody>,
) -> Response {
    let mut state = state.lock().expect("Backend state poisoned");
    match state
        .orders
        .iter_mut()
        .find(|order| order["id"] == body.order_id.as_str())
    {
        Some(order) => {
            order["status"] = json!(body.status);
            ok(order.clone())
        }
        None => fail(StatusCode::NOT_FOUND, "order-e-01", "Order not found"),
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
    size: u32,
}

async fn list_products(State(state): State<Shared>, Query(query): Query<PageQuery>) -> Response {
    state.lock().expect("Backend state poisoned").product_list_hits += 1;
    let content: Vec<Value> = (0..query.size.min(3))
        .map(|i| {
            json!({
                "id": format!("p{}", query.page * query.size + i),
                "name": "Bưởi da xanh",
                "price": 45_000,
                "ocop": { "id": "oc1", "star": 4, "status": "VERIFIED" }
            })
        })
        .collect();
    ok(json!({
        "content": content,
        "page": query.page,
        "totalPages": 2,
        "totalElements": 6
    }))
}

async fn broken() -> Response {
    (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
}

// =============================================================================
// Gemini and OpenWeather
// =============================================================================

async fn generate_content(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if header_value(&headers, "x-goog-api-key").as_deref() != Some(GEMINI_KEY) {
        let error = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }
    let turns = body["contents"].as_array().map_or(0, Vec::len);
    state
        .lock()
        .expect("Backend state poisoned")
        .chat_requests
        .push(body);
    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": "Đã nhận " }, { "text": format!("{turns} lượt") }]
            },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

#[derive(Deserialize)]
struct WeatherQuery {
    q: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    appid: Option<String>,
}

impl WeatherQuery {
    fn rejected(&self) -> Option<Response> {
        (self.appid.as_deref() != Some(OPENWEATHER_KEY)).then(|| {
            let error = json!({ "cod": 401, "message": "Invalid API key." });
            (StatusCode::UNAUTHORIZED, Json(error)).into_response()
        })
    }
}

async fn geocode(Query(query): Query<WeatherQuery>) -> Response {
    if let Some(rejected) = query.rejected() {
        return rejected;
    }
    if query.q.as_deref() != Some("Huế,VN") {
        return Json(json!([])).into_response();
    }
    Json(json!([{
        "name": "Hue",
        "local_names": { "vi": "Huế", "en": "Hue" },
        "lat": 16.4637,
        "lon": 107.5909,
        "country": "VN",
        "state": "Thừa Thiên Huế"
    }]))
    .into_response()
}

async fn current_weather(Query(query): Query<WeatherQuery>) -> Response {
    if let Some(rejected) = query.rejected() {
        return rejected;
    }
    Json(json!({
        "coord": { "lon": query.lon, "lat": query.lat },
        "weather": [{ "id": 500, "main": "Rain", "description": "mưa nhẹ", "icon": "10d" }],
        "base": "stations",
        "main": {
            "temp": 27.4, "feels_like": 30.2, "temp_min": 27.4, "temp_max": 27.4,
            "pressure": 1009, "humidity": 83
        },
        "visibility": 10000,
        "wind": { "speed": 2.6, "deg": 120 },
        "clouds": { "all": 90 },
        "dt": 1_717_236_000,
        "sys": { "country": "VN", "sunrise": 1_717_195_000, "sunset": 1_717_242_000 },
        "timezone": 25200,
        "id": 1_580_240,
        "name": "Huế",
        "cod": 200
    }))
    .into_response()
}

async fn forecast(Query(query): Query<WeatherQuery>) -> Response {
    if let Some(rejected) = query.rejected() {
        return rejected;
    }
    if query.q.as_deref() != Some("Huế") {
        let error = json!({ "cod": "404", "message": "city not found" });
        return (StatusCode::NOT_FOUND, Json(error)).into_response();
    }
    let slot = |dt_txt: &str, temp: f64, pop: f64| {
        json!({
            "dt": 1_717_236_000,
            "main": {
                "temp": temp, "feels_like": temp, "temp_min": temp, "temp_max": temp,
                "pressure": 1009, "humidity": 80
            },
            "weather": [{ "id": 500, "main": "Rain", "description": "mưa nhẹ", "icon": "10d" }],
            "clouds": { "all": 75 },
            "wind": { "speed": 3.1, "deg": 200 },
            "pop": pop,
            "sys": { "pod": "d" },
            "dt_txt": dt_txt
        })
    };
    Json(json!({
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            slot("2024-06-01 09:00:00", 29.0, 0.2),
            slot("2024-06-01 12:00:00", 31.5, 0.6),
            slot("2024-06-02 09:00:00", 28.0, 0.1)
        ],
        "city": {
            "id": 1_580_240,
            "name": "Huế",
            "coord": { "lat": 16.4637, "lon": 107.5909 },
            "country": "VN",
            "timezone": 25200
        }
    }))
    .into_response()
}
