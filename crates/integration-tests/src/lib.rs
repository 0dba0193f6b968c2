//! Integration test support for the Fruity storefront client.
//!
//! [`MockBackend`] serves the shop's REST contract from memory on an
//! ephemeral port, so the client stores can be exercised end to end without
//! a real backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fruity-integration-tests
//! ```
//!
//! # Fixture Data
//!
//! - Products 1 (two variants), 2 (one variant) and 3 (no variants)
//! - Category tree `trai-cay` > `nhiet-doi`, `dac-san`
//! - One customer, [`EMAIL`] / [`PASSWORD`]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use fruity_storefront::services::notifications::NotificationCenter;
use fruity_storefront::session::MemorySessionStore;
use fruity_storefront::{Storefront, StorefrontConfig};

/// Email of the fixture customer.
pub const EMAIL: &str = "lan@example.com";

/// Password of the fixture customer.
pub const PASSWORD: &str = "matkhau123";

/// Cart line held by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCartLine {
    pub id: i64,
    pub product_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
struct MockVariant {
    id: i64,
    product_id: i64,
    name: &'static str,
    price: i64,
    image: &'static str,
}

#[derive(Debug, Clone)]
struct MockOrder {
    id: i64,
    status: String,
    payment_method: String,
    payment_status: String,
    total: Decimal,
    shipping_fee: Decimal,
    items: Vec<MockCartLine>,
}

#[derive(Debug)]
struct MockState {
    next_id: i64,
    tokens: Vec<String>,
    variants: Vec<MockVariant>,
    cart: Vec<MockCartLine>,
    wishlist: Vec<i64>,
    addresses: Vec<Value>,
    orders: Vec<MockOrder>,
    shipping_options: Value,
    shipping_requests: Vec<Value>,
    order_requests: Vec<Value>,
    cart_patches: Vec<i64>,
    fail_order_list: bool,
    fail_cart_add: bool,
    fail_product_list: bool,
    order_list_calls: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_id: 100,
            tokens: Vec::new(),
            variants: vec![
                MockVariant { id: 11, product_id: 1, name: "1kg", price: 85_000, image: "xoai-1kg.jpg" },
                MockVariant { id: 12, product_id: 1, name: "2kg", price: 160_000, image: "xoai-2kg.jpg" },
                MockVariant { id: 21, product_id: 2, name: "1 trái", price: 60_000, image: "buoi.jpg" },
            ],
            cart: Vec::new(),
            wishlist: Vec::new(),
            addresses: Vec::new(),
            orders: Vec::new(),
            shipping_options: json!([
                { "service_id": 53320, "service_type_id": 2, "short_name": "Chuẩn", "fee": 30000, "cod_fee": 0 },
                { "service_id": 53321, "service_type_id": 1, "short_name": "Tiết kiệm", "fee": 22000, "cod_fee": 5000 }
            ]),
            shipping_requests: Vec::new(),
            order_requests: Vec::new(),
            cart_patches: Vec::new(),
            fail_order_list: false,
            fail_cart_add: false,
            fail_product_list: false,
            order_list_calls: 0,
        }
    }
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn variant(&self, id: i64) -> Option<&MockVariant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Backend Handle
// =============================================================================

/// In-memory backend listening on `127.0.0.1`.
pub struct MockBackend {
    base_url: String,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let app = router(Arc::clone(&state));
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let dir = std::env::temp_dir().join(format!("fruity-it-{}", uuid::Uuid::new_v4()));
        StorefrontConfig::for_base_url(&self.base_url, dir).expect("Mock base URL is valid")
    }

    /// A storefront with an in-memory session, not logged in.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        self.storefront_with(self.config())
    }

    /// A storefront built from a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn storefront_with(&self, config: StorefrontConfig) -> Storefront {
        Storefront::new(
            config,
            Arc::new(MemorySessionStore::new()),
            NotificationCenter::in_memory(),
        )
        .expect("Storefront builds against mock backend")
    }

    /// A storefront logged in as the fixture customer.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn logged_in(&self) -> Storefront {
        let storefront = self.storefront();
        storefront
            .auth()
            .login(EMAIL, &SecretString::from(PASSWORD))
            .await
            .expect("Fixture login succeeds");
        storefront
    }

    // =========================================================================
    // Fixture Control
    // =========================================================================

    /// Add an order for the customer.
    pub fn add_order(&self, id: i64, status: &str) {
        lock(&self.state).orders.push(MockOrder {
            id,
            status: status.to_string(),
            payment_method: "cod".to_string(),
            payment_status: "unpaid".to_string(),
            total: Decimal::new(100_000, 0),
            shipping_fee: Decimal::new(30_000, 0),
            items: Vec::new(),
        });
    }

    /// Change an order's status as the shop would.
    pub fn set_order_status(&self, id: i64, status: &str) {
        if let Some(order) = lock(&self.state).orders.iter_mut().find(|o| o.id == id) {
            order.status = status.to_string();
        }
    }

    /// Make `GET /orders/my-orders` fail with 500.
    pub fn fail_order_list(&self, fail: bool) {
        lock(&self.state).fail_order_list = fail;
    }

    /// Make `POST /cart` fail with 500.
    pub fn fail_cart_add(&self, fail: bool) {
        lock(&self.state).fail_cart_add = fail;
    }

    /// Make `GET /products` fail with 500.
    pub fn fail_product_list(&self, fail: bool) {
        lock(&self.state).fail_product_list = fail;
    }

    #[must_use]
    pub fn order_list_calls(&self) -> usize {
        lock(&self.state).order_list_calls
    }

    /// Replace the body of `POST /shipping/options`.
    pub fn set_shipping_options(&self, body: Value) {
        lock(&self.state).shipping_options = body;
    }

    #[must_use]
    pub fn cart(&self) -> Vec<MockCartLine> {
        lock(&self.state).cart.clone()
    }

    /// Quantities received by `PATCH /cart/{id}`, in order.
    #[must_use]
    pub fn cart_patches(&self) -> Vec<i64> {
        lock(&self.state).cart_patches.clone()
    }

    #[must_use]
    pub fn wishlist(&self) -> Vec<i64> {
        lock(&self.state).wishlist.clone()
    }

    /// Bodies received by `POST /shipping/options`.
    #[must_use]
    pub fn shipping_requests(&self) -> Vec<Value> {
        lock(&self.state).shipping_requests.clone()
    }

    /// Bodies received by `POST /orders`.
    #[must_use]
    pub fn order_requests(&self) -> Vec<Value> {
        lock(&self.state).order_requests.clone()
    }

    /// Payment status of an order.
    #[must_use]
    pub fn payment_status(&self, id: i64) -> Option<String> {
        lock(&self.state)
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.payment_status.clone())
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/forgot-password", post(forgot_password))
        .route("/api/v1/auth/reset-password", post(reset_password))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{id}/variants", get(product_variants))
        .route("/api/v1/reviews/products/{id}/reviews", get(product_reviews))
        .route("/api/v1/categories", get(categories))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/{id}", patch(update_cart_line).delete(remove_cart_line))
        .route("/api/v1/wishlist", get(get_wishlist).post(add_to_wishlist))
        .route("/api/v1/wishlist/{id}", axum::routing::delete(remove_from_wishlist))
        .route("/api/v1/customers/addresses", get(list_addresses).post(add_address))
        .route(
            "/api/v1/customers/addresses/{id}",
            patch(update_address).delete(delete_address),
        )
        .route("/api/v1/locations/provinces", get(provinces))
        .route("/api/v1/locations/districts/{code}", get(districts))
        .route("/api/v1/locations/wards/{code}", get(wards))
        .route("/api/v1/shipping/options", post(shipping_options))
        .route("/api/v1/orders", post(create_order))
        .route("/api/v1/orders/my-orders", get(my_orders))
        .route("/api/v1/orders/my-orders/{id}", get(order_detail))
        .route("/api/v1/orders/{id}/payment-status", post(payment_status))
        .route("/api/v1/profile/me", get(get_profile).put(update_profile))
        .route("/api/v1/profile/me/change-password", patch(change_password))
        .route("/api/v1/posts", get(list_posts))
        .route("/api/v1/posts/{slug}", get(get_post))
        .route("/api/v1/contacts", post(submit_contact))
        .with_state(state)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "success": false, "message": text }))).into_response()
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(token) if lock(state).tokens.iter().any(|t| t == token) => Ok(()),
        _ => Err(message(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

/// Integer from a JSON number or numeric string.
fn as_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Price from a JSON number or decimal string.
fn price_of(product: &Value) -> Decimal {
    match &product["price"] {
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Number(n) => n.as_i64().map(Decimal::from).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email != Some(EMAIL) || password != Some(PASSWORD) {
        return message(StatusCode::UNAUTHORIZED, "Email hoặc mật khẩu không đúng");
    }

    let mut s = lock(&state);
    let token = format!("token-{}", s.next_id());
    s.tokens.push(token.clone());
    Json(json!({
        "success": true,
        "token": token,
        "user": { "id": 1, "name": "Nguyễn Thị Lan", "email": EMAIL, "phone": "0901234567", "role": "customer" }
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str) == Some(EMAIL) {
        return Json(json!({ "success": false, "message": "Email đã được sử dụng" })).into_response();
    }
    Json(json!({ "success": true, "message": "Đăng ký thành công! Vui lòng đăng nhập." })).into_response()
}

async fn forgot_password() -> Response {
    Json(json!({ "success": true, "message": "Đã gửi email đặt lại mật khẩu." })).into_response()
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    if body.get("token").and_then(Value::as_str) != Some("valid-reset-token") {
        return message(StatusCode::BAD_REQUEST, "Token không hợp lệ hoặc đã hết hạn");
    }
    Json(json!({ "success": true, "message": "Đặt lại mật khẩu thành công." })).into_response()
}

// =============================================================================
// Catalog
// =============================================================================

fn product_fixtures() -> Vec<Value> {
    vec![
        json!({
            "id": 1, "name": "Xoài cát Hòa Lộc", "slug": "xoai-cat-hoa-loc", "price": "85000.00",
            "category_id": 2, "category_name": "Trái cây nhiệt đới", "is_featured": true,
            "images": { "thumbnail": "xoai.jpg", "gallery": ["xoai-1.jpg"] },
            "created_at": "2025-03-01T08:00:00Z"
        }),
        json!({
            "id": "2", "name": "Bưởi da xanh", "slug": "buoi-da-xanh", "price": 60000,
            "category_id": 2, "category_name": "Trái cây nhiệt đới", "is_featured": false,
            "images": null, "created_at": "2025-03-05T08:00:00Z"
        }),
        json!({
            "id": 3, "name": "Sầu riêng Ri6", "slug": "sau-rieng-ri6", "price": "150000",
            "category_id": 3, "category_name": "Đặc sản", "is_featured": true,
            "images": "not-an-object", "created_at": "2025-02-20T08:00:00Z"
        }),
    ]
}

async fn list_products(State(state): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Response {
    if lock(&state).fail_product_list {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi máy chủ");
    }
    let mut products = product_fixtures();

    if let Some(search) = query.get("search").map(|s| s.to_lowercase()) {
        products.retain(|p| {
            let name = p["name"].as_str().unwrap_or_default().to_lowercase();
            let slug = p["slug"].as_str().unwrap_or_default().replace('-', " ");
            name.contains(&search) || slug.contains(&search)
        });
    }
    if let Some(category) = query.get("categoryId").and_then(|c| c.parse::<i64>().ok()) {
        products.retain(|p| as_i64(p.get("category_id")) == Some(category));
    }
    if query.get("isFeatured").map(String::as_str) == Some("true") {
        products.retain(|p| p["is_featured"] == json!(true));
    }
    if query.get("sortBy").map(String::as_str) == Some("price") {
        products.sort_by_key(price_of);
        if query.get("sortOrder").map(String::as_str) == Some("desc") {
            products.reverse();
        }
    }

    let total = products.len();
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(12);
    products.truncate(limit);

    Json(json!({
        "data": products,
        "pagination": { "totalItems": total, "totalPages": 1, "currentPage": 1 }
    }))
    .into_response()
}

async fn product_variants(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let variants: Vec<Value> = lock(&state)
        .variants
        .iter()
        .filter(|v| v.product_id == id)
        .map(|v| json!({ "id": v.id, "name": v.name, "price": format!("{}.00", v.price), "image": v.image }))
        .collect();
    Json(Value::Array(variants)).into_response()
}

async fn product_reviews(Path(id): Path<i64>) -> Response {
    if id == 1 {
        return Json(json!([
            { "id": 1, "customer_name": "Minh", "rating": 5, "content": "Xoài ngọt, thơm.", "created_at": "2025-03-10" }
        ]))
        .into_response();
    }
    Json(json!([])).into_response()
}

async fn categories() -> Response {
    Json(json!([
        {
            "id": 1, "name": "Trái cây", "slug": "trai-cay", "parent_id": null,
            "children": [
                { "id": 2, "name": "Trái cây nhiệt đới", "slug": "nhiet-doi", "parent_id": 1, "children": [] },
                { "id": 3, "name": "Đặc sản", "slug": "dac-san", "parent_id": 1, "children": [] }
            ]
        }
    ]))
    .into_response()
}

// =============================================================================
// Cart
// =============================================================================

fn cart_body(s: &MockState) -> Value {
    let names: HashMap<i64, (String, String)> = product_fixtures()
        .iter()
        .filter_map(|p| {
            Some((
                as_i64(p.get("id"))?,
                (p["name"].as_str()?.to_string(), p["slug"].as_str()?.to_string()),
            ))
        })
        .collect();

    let lines: Vec<Value> = s
        .cart
        .iter()
        .map(|line| {
            let (name, slug) = names.get(&line.product_id).cloned().unwrap_or_default();
            let variant = s.variant(line.variant_id);
            json!({
                "id": line.id,
                "quantity": line.quantity,
                "product": { "id": line.product_id, "name": name, "slug": slug },
                "variant": variant.map(|v| json!({
                    "id": v.id,
                    "price": format!("{}.00", v.price),
                    "image": [v.image, ""]
                }))
            })
        })
        .collect();
    json!({ "data": lines })
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    Json(cart_body(&lock(&state))).into_response()
}

async fn add_to_cart(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let (Some(variant_id), Some(quantity)) = (as_i64(body.get("variantId")), as_i64(body.get("quantity"))) else {
        return message(StatusCode::BAD_REQUEST, "variantId và quantity là bắt buộc");
    };
    if quantity <= 0 {
        return message(StatusCode::BAD_REQUEST, "Số lượng không hợp lệ");
    }

    let mut s = lock(&state);
    if s.fail_cart_add {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi máy chủ");
    }
    let Some(product_id) = s.variant(variant_id).map(|v| v.product_id) else {
        return message(StatusCode::NOT_FOUND, "Không tìm thấy biến thể");
    };
    if let Some(line) = s.cart.iter_mut().find(|l| l.variant_id == variant_id) {
        line.quantity += quantity;
    } else {
        let id = s.next_id();
        s.cart.push(MockCartLine {
            id,
            product_id,
            variant_id,
            quantity,
        });
    }
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn update_cart_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let Some(quantity) = as_i64(body.get("quantity")) else {
        return message(StatusCode::BAD_REQUEST, "quantity là bắt buộc");
    };

    let mut s = lock(&state);
    s.cart_patches.push(quantity);
    match s.cart.iter_mut().find(|l| l.id == id) {
        Some(line) => {
            line.quantity = quantity;
            Json(json!({ "success": true })).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Không tìm thấy sản phẩm trong giỏ"),
    }
}

async fn remove_cart_line(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    lock(&state).cart.retain(|l| l.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    lock(&state).cart.clear();
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Wishlist
// =============================================================================

async fn get_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let ids = lock(&state).wishlist.clone();
    let items: Vec<Value> = product_fixtures()
        .into_iter()
        .filter(|p| as_i64(p.get("id")).is_some_and(|id| ids.contains(&id)))
        .map(|p| {
            // Ids come back as strings, as the real backend does for joins
            json!({ "product": {
                "id": as_i64(p.get("id")).map(|id| id.to_string()),
                "name": p["name"], "slug": p["slug"], "price": p["price"], "images": p["images"]
            }})
        })
        .collect();
    Json(Value::Array(items)).into_response()
}

async fn add_to_wishlist(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let Some(id) = as_i64(body.get("productId")) else {
        return message(StatusCode::BAD_REQUEST, "productId là bắt buộc");
    };
    let mut s = lock(&state);
    if !s.wishlist.contains(&id) {
        s.wishlist.push(id);
    }
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn remove_from_wishlist(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    lock(&state).wishlist.retain(|p| *p != id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Addresses & Locations
// =============================================================================

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    Json(Value::Array(lock(&state).addresses.clone())).into_response()
}

fn set_single_default(addresses: &mut [Value], id: i64) {
    for a in addresses {
        a["is_default"] = json!(as_i64(a.get("id")) == Some(id));
    }
}

async fn add_address(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let mut s = lock(&state);
    let id = s.next_id();
    let mut address = body;
    address["id"] = json!(id);
    address["province_name"] = json!("TP. Hồ Chí Minh");
    address["district_name"] = json!("Quận 1");
    address["ward_name"] = json!("Phường Bến Nghé");
    let make_default = s.addresses.is_empty() || address["is_default"] == json!(true);
    s.addresses.push(address.clone());
    if make_default {
        set_single_default(&mut s.addresses, id);
    }
    (StatusCode::CREATED, Json(address)).into_response()
}

async fn update_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let mut s = lock(&state);
    let Some(address) = s.addresses.iter_mut().find(|a| as_i64(a.get("id")) == Some(id)) else {
        return message(StatusCode::NOT_FOUND, "Không tìm thấy địa chỉ");
    };
    if let (Value::Object(target), Value::Object(changes)) = (address, &body) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    if body.get("is_default") == Some(&json!(true)) {
        set_single_default(&mut s.addresses, id);
    }
    Json(json!({ "success": true })).into_response()
}

async fn delete_address(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    lock(&state).addresses.retain(|a| as_i64(a.get("id")) != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn provinces() -> Response {
    Json(json!([{ "code": 79, "name": "TP. Hồ Chí Minh" }, { "code": 1, "name": "Hà Nội" }])).into_response()
}

async fn districts(Path(code): Path<String>) -> Response {
    if code == "79" {
        return Json(json!({ "data": [{ "code": "1442", "name": "Quận 1" }] })).into_response();
    }
    Json(json!([])).into_response()
}

async fn wards(Path(code): Path<String>) -> Response {
    if code == "1442" {
        return Json(json!([{ "code": "20109", "name": "Phường Bến Nghé" }])).into_response();
    }
    Json(json!([])).into_response()
}

// =============================================================================
// Shipping & Orders
// =============================================================================

async fn shipping_options(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = lock(&state);
    s.shipping_requests.push(body);
    Json(s.shipping_options.clone()).into_response()
}

async fn create_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let mut s = lock(&state);
    s.order_requests.push(body.clone());

    let address_id = as_i64(body.get("addressId"));
    if !s.addresses.iter().any(|a| as_i64(a.get("id")) == address_id) {
        return message(StatusCode::BAD_REQUEST, "Địa chỉ không hợp lệ");
    }
    if s.cart.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Giỏ hàng trống");
    }

    // Fees are sent as JSON floats
    let shipping_fee = body
        .pointer("/shippingOption/fee")
        .and_then(Value::as_f64)
        .and_then(Decimal::from_f64_retain)
        .unwrap_or_default();
    let items_total: i64 = s
        .cart
        .iter()
        .map(|l| s.variant(l.variant_id).map_or(0, |v| v.price) * l.quantity)
        .sum();
    let method = body
        .get("paymentMethod")
        .and_then(Value::as_str)
        .unwrap_or("cod")
        .to_string();

    let id = s.next_id();
    let items = s.cart.clone();
    s.orders.push(MockOrder {
        id,
        status: "pending".to_string(),
        payment_method: method.clone(),
        payment_status: if method == "momo" { "pending" } else { "unpaid" }.to_string(),
        total: Decimal::from(items_total) + shipping_fee,
        shipping_fee,
        items,
    });

    let response = if method == "momo" {
        json!({
            "order": { "id": id, "order_number": format!("FF{id}") },
            "payment": { "payUrl": format!("https://test-payment.momo.vn/pay/{id}") }
        })
    } else {
        json!({ "order": { "id": id, "order_number": format!("FF{id}") }, "message": "Đặt hàng thành công" })
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

fn order_summary(order: &MockOrder) -> Value {
    json!({
        "id": order.id,
        "order_number": format!("FF{}", order.id),
        "order_status": order.status,
        "payment_method": order.payment_method,
        "payment_status": order.payment_status,
        "total_amount": order.total.to_string(),
        "order_date": "2025-03-12T09:30:00Z"
    })
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let mut s = lock(&state);
    s.order_list_calls += 1;
    if s.fail_order_list {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi máy chủ");
    }
    let orders: Vec<Value> = s.orders.iter().map(order_summary).collect();
    Json(json!({ "orders": orders })).into_response()
}

async fn order_detail(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let s = lock(&state);
    let Some(order) = s.orders.iter().find(|o| o.id == id) else {
        return message(StatusCode::NOT_FOUND, "Không tìm thấy đơn hàng");
    };

    let mut body = order_summary(order);
    body["customer_name"] = json!("Nguyễn Thị Lan");
    body["customer_phone"] = json!("0901234567");
    body["shipping_address"] = json!("1 Lê Lợi, Phường Bến Nghé, Quận 1, TP. Hồ Chí Minh");
    body["shipping_fee"] = json!(order.shipping_fee.to_string());
    body["items"] = Value::Array(
        order
            .items
            .iter()
            .map(|l| {
                let price = s.variant(l.variant_id).map_or(0, |v| v.price);
                json!({ "product_name": format!("Sản phẩm {}", l.product_id), "quantity": l.quantity, "unit_price": price })
            })
            .collect(),
    );
    body["history"] = json!([{ "status": "pending", "notes": "Đơn hàng mới", "created_at": "2025-03-12T09:30:00Z" }]);
    body["shipment"] = json!({ "carrier_code": "ghn", "tracking_number": null, "status": "ready_to_pick", "shipping_cost": order.shipping_fee.to_string() });
    Json(json!({ "order": body })).into_response()
}

async fn payment_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let Some(status) = body.get("status").and_then(Value::as_str) else {
        return message(StatusCode::BAD_REQUEST, "status là bắt buộc");
    };
    let mut s = lock(&state);
    match s.orders.iter_mut().find(|o| o.id == id) {
        Some(order) => {
            order.payment_status = status.to_string();
            Json(json!({ "success": true, "message": "Đã cập nhật trạng thái thanh toán" })).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Không tìm thấy đơn hàng"),
    }
}

// =============================================================================
// Profile & Content
// =============================================================================

async fn get_profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let order_count = lock(&state).orders.len();
    Json(json!({
        "id": 1, "name": "Nguyễn Thị Lan", "email": EMAIL, "phone": "0901234567",
        "customer_id": 501, "total_spent": "1250000.00", "order_count": order_count,
        "last_order_date": null
    }))
    .into_response()
}

async fn update_profile(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    Json(json!({
        "id": 1,
        "name": body.get("name").cloned().unwrap_or_else(|| json!("Nguyễn Thị Lan")),
        "email": EMAIL,
        "phone": body.get("phone").cloned().unwrap_or_else(|| json!("0901234567")),
        "avatar": body.get("avatar").cloned().unwrap_or(Value::Null)
    }))
    .into_response()
}

async fn change_password(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    if body.get("currentPassword").and_then(Value::as_str) != Some(PASSWORD) {
        return message(StatusCode::BAD_REQUEST, "Mật khẩu hiện tại không đúng");
    }
    Json(json!({ "success": true, "message": "Đổi mật khẩu thành công" })).into_response()
}

async fn list_posts() -> Response {
    Json(json!([
        {
            "id": 1, "title": "Mùa xoài 2025", "slug": "mua-xoai-2025", "excerpt": "Xoài cát đã về.",
            "author_name": "Fruity", "published_at": "2025-03-01", "category_name": "Tin tức",
            "views": 120, "seo_title": null
        }
    ]))
    .into_response()
}

async fn get_post(Path(slug): Path<String>) -> Response {
    if slug != "mua-xoai-2025" {
        return message(StatusCode::NOT_FOUND, "Không tìm thấy bài viết");
    }
    Json(json!({
        "id": 1, "title": "Mùa xoài 2025", "slug": slug, "content": "Xoài cát Hòa Lộc đã có hàng.",
        "author_name": "Fruity", "views": 121, "seo_title": "Mùa xoài 2025 | Fruity Fruit"
    }))
    .into_response()
}

async fn submit_contact(Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str).is_none_or(str::is_empty) {
        return message(StatusCode::BAD_REQUEST, "Email là bắt buộc");
    }
    (StatusCode::CREATED, Json(json!({ "success": true, "message": "Cảm ơn bạn đã liên hệ!" }))).into_response()
}
