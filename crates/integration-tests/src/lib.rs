//! Integration test support for Respawn.
//!
//! [`MockBackend`] serves the REST backend's endpoints from memory on an
//! ephemeral port, records every request it sees (method, path and
//! `Authorization` header) and can be told to fail or stall a path. Tests
//! drive the real [`BackendClient`], the storefront services and the admin
//! server against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p respawn-integration-tests
//! ```
//!
//! Every account in [`fixture`] signs in with the password [`PASSWORD`] and
//! receives the token `token-{id}`.

#![allow(clippy::missing_panics_doc)]

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use respawn_api::{ApiConfig, BackendClient};
use respawn_core::account::User;
use respawn_core::cart::{AddToCart, CartItem};
use respawn_core::catalog::{Category, CategoryInput, Product, ProductInput};
use respawn_core::order::{NewOrder, Order, StatusUpdate};
use respawn_core::{CategoryId, ModerationAction, OrderId, OrderStatus, ProductId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Password accepted for every fixture account.
pub const PASSWORD: &str = "secret";

/// A request as the mock backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path below `/api`, e.g. `/cart/add`.
    pub path: String,
    pub authorization: Option<String>,
}

/// Everything the mock backend stores.
#[derive(Debug, Default)]
pub struct MockState {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub users: Vec<User>,
    pub carts: HashMap<UserId, Vec<CartItem>>,
    pub favorites: HashMap<UserId, BTreeSet<ProductId>>,
    pub orders: Vec<Order>,
    /// `(file name, content type, size)` of every accepted upload.
    pub uploads: Vec<(String, String, usize)>,
    requests: Vec<RecordedRequest>,
    faults: HashMap<String, StatusCode>,
    delays: HashMap<String, Duration>,
    response_delays: HashMap<String, Duration>,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock backend. The server stops when this is dropped.
pub struct MockBackend {
    state: Shared,
    url: Url,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Serve `state` on `127.0.0.1` at an ephemeral port.
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let (addr, handle) = spawn(router(state.clone())).await;
        let url = Url::parse(&format!("http://{addr}/api/")).expect("mock backend URL");
        Self { state, url, handle }
    }

    /// Serve the standard [`fixture`].
    pub async fn with_fixture() -> Self {
        Self::start(fixture()).await
    }

    /// Base URL, ending in `/api/`.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// A client for this backend with the catalog cache off, so every call
    /// reaches the server.
    #[must_use]
    pub fn client(&self) -> BackendClient {
        let config = ApiConfig::new(self.url.clone()).with_catalog_cache_ttl(Duration::ZERO);
        BackendClient::new(&config).expect("backend client")
    }

    /// A client with the default configuration, catalog cache included.
    #[must_use]
    pub fn caching_client(&self) -> BackendClient {
        BackendClient::new(&ApiConfig::new(self.url.clone())).expect("backend client")
    }

    /// Read or change the stored data.
    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Number of requests received for `method path`.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }

    /// Answer every request to `path` with `status`.
    pub fn fail(&self, path: &str, status: StatusCode) {
        lock(&self.state).faults.insert(path.to_string(), status);
    }

    /// Answer only `method path` with `status`; other methods on the same
    /// path still succeed.
    pub fn fail_method(&self, method: &str, path: &str, status: StatusCode) {
        lock(&self.state)
            .faults
            .insert(format!("{method} {path}"), status);
    }

    /// Stop failing `path`.
    pub fn recover(&self, path: &str) {
        lock(&self.state).faults.remove(path);
    }

    /// Hold every request to `path` for `delay` before answering.
    pub fn delay(&self, path: &str, delay: Duration) {
        lock(&self.state).delays.insert(path.to_string(), delay);
    }

    /// Answer `path` from the state as it is now, but hold the response for
    /// `delay`. Changes made meanwhile are not in the answer.
    pub fn delay_response(&self, path: &str, delay: Duration) {
        lock(&self.state)
            .response_delays
            .insert(path.to_string(), delay);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `app` on `127.0.0.1` at an ephemeral port and return its address.
/// The server runs until the test's runtime shuts down.
pub async fn serve(app: Router) -> SocketAddr {
    spawn(app).await.0
}

async fn spawn(app: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    (addr, handle)
}

// =============================================================================
// Fixture
// =============================================================================

/// Catalog, accounts and orders shared by the tests.
///
/// - categories: Games (1) > PC Games (2), Accessories (3)
/// - products: Controller $10.00, USB Cable $5.50, Space Sim $59.99 (no
///   stock), Racing Game $39.99
/// - users: ada (admin), bob (customer), eve (customer, banned)
/// - orders: #1001 pending and #1002 delivered, both bob's
#[must_use]
pub fn fixture() -> MockState {
    let categories = serde_json::from_value(json!([
        {"id": 1, "name": "Games"},
        {"id": 2, "name": "PC Games", "parentId": 1},
        {"id": 3, "name": "Accessories"}
    ]))
    .expect("category fixture");

    let products = serde_json::from_value(json!([
        {"id": 1, "name": "Controller", "price": "10.00", "stock": 5, "categoryId": 3,
         "createdAt": "2026-01-01T00:00:00Z"},
        {"id": 2, "name": "USB Cable", "price": "5.50", "stock": 20, "categoryId": 3,
         "createdAt": "2026-02-01T00:00:00Z"},
        {"id": 3, "name": "Space Sim", "price": "59.99", "stock": 0, "categoryId": 2,
         "specifications": {"platform": "PC"}, "createdAt": "2026-03-01T00:00:00Z"},
        {"id": 4, "name": "Racing Game", "price": "39.99", "stock": 3, "categoryId": 1,
         "createdAt": "2026-04-01T00:00:00Z"}
    ]))
    .expect("product fixture");

    let address = json!({
        "id": 1,
        "fullName": "Bob Builder",
        "street": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "US",
        "isDefault": true
    });

    let users = serde_json::from_value(json!([
        {"id": 1, "username": "ada", "email": "ada@respawn.test", "firstName": "Ada",
         "lastName": "Admin", "role": "ADMIN", "createdAt": "2025-01-01T00:00:00Z"},
        {"id": 2, "username": "bob", "email": "bob@respawn.test", "firstName": "Bob",
         "lastName": "Builder", "addresses": [address.clone()], "createdAt": "2025-06-01T00:00:00Z"},
        {"id": 3, "username": "eve", "email": "eve@respawn.test", "status": "BANNED",
         "createdAt": "2025-09-01T00:00:00Z"}
    ]))
    .expect("user fixture");

    let orders = serde_json::from_value(json!([
        {"id": 1001, "userId": 2, "status": "PENDING", "totalPrice": "25.50",
         "items": [
            {"productId": 1, "name": "Controller", "quantity": 2, "price": "10.00"},
            {"productId": 2, "name": "USB Cable", "quantity": 1, "price": "5.50"}
         ],
         "shippingAddress": address.clone(), "createdAt": "2026-10-01T12:00:00Z"},
        {"id": 1002, "userId": 2, "status": "DELIVERED", "totalPrice": "10.00",
         "items": [{"productId": 1, "name": "Controller", "quantity": 1, "price": "10.00"}],
         "shippingAddress": address, "createdAt": "2026-09-01T12:00:00Z"}
    ]))
    .expect("order fixture");

    MockState {
        products,
        categories,
        users,
        orders,
        ..MockState::default()
    }
}

// =============================================================================
// Server
// =============================================================================

type Reply = Result<Response, Response>;

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/users", get(users))
        .route("/users/profile", get(profile))
        .route("/users/{id}/{action}", patch(moderate))
        .route("/categories", get(categories).post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/products", get(products).post(create_product))
        .route(
            "/products/{id}",
            get(product).put(update_product).delete(delete_product),
        )
        .route("/upload", post(upload))
        .route("/cart", get(cart).delete(clear_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/remove/{id}", delete(remove_from_cart))
        .route("/favorites", get(favorites).post(add_favorite))
        .route("/favorites/{id}", delete(remove_favorite))
        .route("/orders", get(all_orders).post(create_order))
        .route("/orders/weekly-profit", get(weekly_profit))
        .route("/orders/user/{id}", get(user_orders))
        .route("/orders/{id}", get(order).put(update_order))
        .route("/orders/{id}/cancel", patch(cancel_order))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(state, record))
}

/// Log the request, then apply any configured delay or failure.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| request.uri().path())
        .to_string();
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (fault, delay, response_delay) = {
        let mut state = lock(&state);
        state.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: path.clone(),
            authorization,
        });
        let scoped = format!("{} {path}", request.method());
        (
            state
                .faults
                .get(&scoped)
                .or_else(|| state.faults.get(&path))
                .copied(),
            state.delays.get(&path).copied(),
            state.response_delays.get(&path).copied(),
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = fault {
        return reject(status, "Injected failure");
    }
    let response = next.run(request).await;
    if let Some(delay) = response_delay {
        tokio::time::sleep(delay).await;
    }
    response
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// The account behind a `Bearer token-{id}` header.
fn signed_in(state: &MockState, headers: &HeaderMap) -> Result<User, Response> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"))
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|id| state.users.iter().find(|u| u.id == UserId::new(id)).cloned())
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Missing or invalid token"))
}

fn admin(state: &MockState, headers: &HeaderMap) -> Result<User, Response> {
    let user = signed_in(state, headers)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(reject(StatusCode::FORBIDDEN, "Admin role required"))
    }
}

#[derive(Deserialize)]
struct Credentials {
    identifier: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Reply {
    let state = lock(&state);
    let user = state
        .users
        .iter()
        .find(|u| {
            u.username.eq_ignore_ascii_case(&body.identifier)
                || u.email.eq_ignore_ascii_case(&body.identifier)
        })
        .filter(|_| body.password == PASSWORD)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    if !user.is_active() {
        return Err(reject(StatusCode::FORBIDDEN, "Account is not active"));
    }
    Ok(Json(json!({ "token": format!("token-{}", user.id), "user": user })).into_response())
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let user = signed_in(&lock(&state), &headers)?;
    Ok(Json(user).into_response())
}

async fn users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    admin(&state, &headers)?;
    Ok(Json(&state.users).into_response())
}

async fn moderate(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, action)): Path<(UserId, String)>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    let action: ModerationAction = action
        .parse()
        .map_err(|e: String| reject(StatusCode::BAD_REQUEST, &e))?;
    let user = state
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    user.status = action.resulting_status();
    Ok(StatusCode::OK.into_response())
}

async fn categories(State(state): State<Shared>) -> Json<Vec<Category>> {
    Json(lock(&state).categories.clone())
}

async fn products(State(state): State<Shared>) -> Json<Vec<Product>> {
    Json(lock(&state).products.clone())
}

fn find_product(state: &MockState, id: ProductId) -> Result<Product, Response> {
    state
        .products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))
}

async fn product(State(state): State<Shared>, Path(id): Path<ProductId>) -> Reply {
    Ok(Json(find_product(&lock(&state), id)?).into_response())
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    let user = signed_in(&state, &headers)?;
    let items = state.carts.get(&user.id).cloned().unwrap_or_default();
    Ok(Json(json!({ "items": items })).into_response())
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddToCart>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    let product = find_product(&state, body.product_id)?;
    if !product.in_stock() {
        return Err(reject(StatusCode::BAD_REQUEST, "Product is out of stock"));
    }

    let items = state.carts.entry(user.id).or_default();
    match items.iter_mut().find(|item| item.product.id == body.product_id) {
        Some(item) => item.quantity += body.quantity,
        None => items.push(CartItem {
            id: None,
            product,
            quantity: body.quantity,
        }),
    }
    Ok(StatusCode::OK.into_response())
}

async fn remove_from_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    if let Some(items) = state.carts.get_mut(&user.id) {
        items.retain(|item| item.product.id != id);
    }
    Ok(StatusCode::OK.into_response())
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    state.carts.remove(&user.id);
    Ok(StatusCode::OK.into_response())
}

async fn favorites(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    let user = signed_in(&state, &headers)?;
    let ids = state.favorites.get(&user.id).cloned().unwrap_or_default();
    let products: Vec<&Product> = state
        .products
        .iter()
        .filter(|p| ids.contains(&p.id))
        .collect();
    Ok(Json(products).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteBody {
    product_id: ProductId,
}

async fn add_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<FavoriteBody>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    find_product(&state, body.product_id)?;
    state
        .favorites
        .entry(user.id)
        .or_default()
        .insert(body.product_id);
    Ok(StatusCode::OK.into_response())
}

async fn remove_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    if let Some(ids) = state.favorites.get_mut(&user.id) {
        ids.remove(&id);
    }
    Ok(StatusCode::OK.into_response())
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewOrder>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    if body.items.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Order has no items"));
    }

    let next_id = state.orders.iter().map(|o| o.id.as_i64()).max().unwrap_or(1000) + 1;
    let order = Order {
        id: OrderId::new(next_id),
        user_id: user.id,
        status: OrderStatus::Pending,
        items: body.items,
        shipping_address: body.shipping_address,
        total_price: body.total_price,
        payment_method: Some(body.payment_method),
        created_at: Some(chrono::Utc::now()),
        updated_at: None,
    };
    state.orders.push(order.clone());
    Ok((StatusCode::CREATED, Json(order)).into_response())
}

async fn all_orders(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    admin(&state, &headers)?;
    Ok(Json(&state.orders).into_response())
}

async fn user_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
) -> Reply {
    let state = lock(&state);
    let user = signed_in(&state, &headers)?;
    if user.id != id && !user.is_admin() {
        return Err(reject(StatusCode::FORBIDDEN, "Not your orders"));
    }
    let orders: Vec<&Order> = state.orders.iter().filter(|o| o.user_id == id).collect();
    Ok(Json(orders).into_response())
}

/// The order `id` if `user` owns it or is an admin.
fn visible_order(state: &MockState, user: &User, id: OrderId) -> Result<usize, Response> {
    state
        .orders
        .iter()
        .position(|o| o.id == id && (o.user_id == user.id || user.is_admin()))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Order not found"))
}

async fn order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<OrderId>) -> Reply {
    let state = lock(&state);
    let user = signed_in(&state, &headers)?;
    let index = visible_order(&state, &user, id)?;
    Ok(Json(state.orders.get(index)).into_response())
}

async fn update_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Reply {
    let mut state = lock(&state);
    let user = admin(&state, &headers)?;
    let index = visible_order(&state, &user, id)?;
    let order = state
        .orders
        .get_mut(index)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Order not found"))?;
    order.status = body.status;
    order.updated_at = Some(chrono::Utc::now());
    Ok(Json(order.clone()).into_response())
}

async fn cancel_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Reply {
    let mut state = lock(&state);
    let user = signed_in(&state, &headers)?;
    let index = visible_order(&state, &user, id)?;
    let order = state
        .orders
        .get_mut(index)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Order not found"))?;
    if order.status.is_final() {
        return Err(reject(StatusCode::BAD_REQUEST, "Order can no longer be cancelled"));
    }
    order.status = OrderStatus::Cancelled;
    Ok(Json(order.clone()).into_response())
}

async fn weekly_profit(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    admin(&state, &headers)?;
    let counted: Vec<&Order> = state
        .orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .collect();
    let profit: Decimal = counted.iter().map(|o| o.total_price).sum();
    Ok(Json(json!({ "profit": profit, "orders": counted.len() })).into_response())
}

// =============================================================================
// Catalog writes
// =============================================================================

fn product_from(id: ProductId, input: ProductInput) -> Product {
    Product {
        id,
        name: input.name,
        description: input.description,
        price: input.price,
        stock: input.stock,
        image_url: input.image_url,
        category_id: input.category_id,
        specifications: input.specifications,
        created_at: Some(chrono::Utc::now()),
        updated_at: None,
    }
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    let next = state.products.iter().map(|p| p.id.as_i64()).max().unwrap_or(0) + 1;
    let product = product_from(ProductId::new(next), input);
    state.products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    let product = state
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))?;
    let created_at = product.created_at;
    *product = Product {
        created_at,
        updated_at: Some(chrono::Utc::now()),
        ..product_from(id, input)
    };
    Ok(Json(product.clone()).into_response())
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    find_product(&state, id)?;
    state.products.retain(|p| p.id != id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<CategoryInput>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    let next = state.categories.iter().map(|c| c.id.as_i64()).max().unwrap_or(0) + 1;
    let category = Category {
        id: CategoryId::new(next),
        name: input.name,
        description: input.description,
        image_url: input.image_url,
        parent_id: input.parent_id,
    };
    state.categories.push(category.clone());
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    let category = state
        .categories
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Category not found"))?;
    *category = Category {
        id,
        name: input.name,
        description: input.description,
        image_url: input.image_url,
        parent_id: input.parent_id,
    };
    Ok(Json(category.clone()).into_response())
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<CategoryId>,
) -> Reply {
    let mut state = lock(&state);
    admin(&state, &headers)?;
    if !state.categories.iter().any(|c| c.id == id) {
        return Err(reject(StatusCode::NOT_FOUND, "Category not found"));
    }
    state.categories.retain(|c| c.id != id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Accepts one `image` part and answers with a hosted URL.
async fn upload(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    admin(&lock(&state), &headers)?;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| reject(StatusCode::BAD_REQUEST, "Unreadable upload"))?;

        let url = format!("https://cdn.respawn.test/{file_name}");
        lock(&state)
            .uploads
            .push((file_name, content_type, bytes.len()));
        return Ok(Json(json!({ "url": url })).into_response());
    }

    Err(reject(StatusCode::BAD_REQUEST, "Missing image part"))
}
