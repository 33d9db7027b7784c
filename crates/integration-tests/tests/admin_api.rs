//! The admin server end to end: sign-in, order status rules, the cached
//! user list, catalog edits and image uploads, with the mock backend behind
//! it.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use respawn_admin::config::AdminConfig;
use respawn_admin::state::AppState;
use respawn_core::{AccountStatus, CategoryId, OrderId, OrderStatus, ProductId, UserId};
use respawn_integration_tests::{MockBackend, PASSWORD, serve};
use serde_json::{Value, json};

struct Admin {
    base_url: String,
    http: Client,
}

impl Admin {
    async fn start(backend: &MockBackend) -> Self {
        let backend_url = backend.url().to_string();
        let config = AdminConfig::from_lookup(|key| {
            (key == "BACKEND_URL").then(|| backend_url.clone())
        })
        .unwrap();
        let state = AppState::with_client(config, backend.client());
        let addr = serve(respawn_admin::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            http: Client::builder().cookie_store(true).build().unwrap(),
        }
    }

    async fn signed_in(backend: &MockBackend) -> Self {
        let admin = Self::start(backend).await;
        let resp = admin.login("ada").await;
        assert_eq!(resp.status(), StatusCode::OK);
        backend.clear_requests();
        admin
    }

    async fn login(&self, identifier: &str) -> reqwest::Response {
        self.http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "identifier": identifier, "password": PASSWORD }))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }

    async fn set_status(&self, order: i64, status: &str) -> reqwest::Response {
        self.http
            .put(format!("{}/orders/{order}/status", self.base_url))
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap()
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> reqwest::Response {
        let mut request = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.unwrap()
    }

    async fn upload(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> reqwest::Response {
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .unwrap();
        self.http
            .post(format!("{}/uploads", self.base_url))
            .multipart(Form::new().part("image", part))
            .send()
            .await
            .unwrap()
    }

    async fn moderate(&self, user: i64, action: &str) -> reqwest::Response {
        self.http
            .post(format!("{}/users/{user}/{action}", self.base_url))
            .send()
            .await
            .unwrap()
    }
}

fn order_status(backend: &MockBackend, id: i64) -> OrderStatus {
    backend.with(|state| {
        state
            .orders
            .iter()
            .find(|o| o.id == OrderId::new(id))
            .unwrap()
            .status
    })
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_routes_require_sign_in() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::start(&backend).await;

    let resp = admin.get("/orders").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_customer_cannot_sign_in() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::start(&backend).await;

    assert_eq!(admin.login("bob").await.status(), StatusCode::FORBIDDEN);
    assert_eq!(admin.get("/auth/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_session_survives_requests() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let me: Value = admin.get("/auth/me").await.json().await.unwrap();
    assert_eq!(me["email"], "ada@respawn.test");

    let resp = admin.get("/orders").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        backend.requests().last().unwrap().authorization.as_deref(),
        Some("Bearer token-1")
    );
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_status_update() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.set_status(1001, "SHIPPED").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = resp.json().await.unwrap();
    assert_eq!(order["status"], "SHIPPED");
    assert_eq!(order_status(&backend, 1001), OrderStatus::Shipped);
}

#[tokio::test]
async fn test_final_order_is_conflict_without_mutation() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.set_status(1002, "PROCESSING").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("delivered"));

    assert_eq!(backend.count("GET", "/orders/1002"), 1);
    assert_eq!(backend.count("PUT", "/orders/1002"), 0);
    assert_eq!(order_status(&backend, 1002), OrderStatus::Delivered);
}

#[tokio::test]
async fn test_same_status_is_noop() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.set_status(1001, "PENDING").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(backend.count("PUT", "/orders/1001"), 0);
}

#[tokio::test]
async fn test_order_filters() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let list: Value = admin
        .get("/orders?status=DELIVERED")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["id"], 1002);

    let list: Value = admin.get("/orders?search=%231001").await.json().await.unwrap();
    assert_eq!(list["total"], 1);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_list_is_cached_until_moderation() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let list: Value = admin.get("/users").await.json().await.unwrap();
    assert_eq!(list["total"], 3);
    admin.get("/users?search=bob").await;
    assert_eq!(backend.count("GET", "/users"), 1);

    let resp = admin.moderate(2, "ban").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let result: Value = resp.json().await.unwrap();
    assert_eq!(result["status"], "BANNED");

    let list: Value = admin.get("/users?status=BANNED").await.json().await.unwrap();
    assert_eq!(backend.count("GET", "/users"), 2);
    let banned: Vec<i64> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(banned, vec![3, 2]);

    let bob = backend.with(|state| {
        state
            .users
            .iter()
            .find(|u| u.id == UserId::new(2))
            .unwrap()
            .status
    });
    assert_eq!(bob, AccountStatus::Banned);
}

#[tokio::test]
async fn test_list_fetched_during_moderation_is_not_cached() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;
    backend.delay_response("/users", Duration::from_millis(300));

    let (list, resp) = tokio::join!(admin.get("/users?status=BANNED"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        admin.moderate(2, "ban").await
    });
    assert_eq!(resp.status(), StatusCode::OK);
    // Read before the ban landed
    let list: Value = list.json().await.unwrap();
    assert_eq!(list["total"], 1);

    let list: Value = admin.get("/users?status=BANNED").await.json().await.unwrap();
    assert_eq!(list["total"], 2);
    assert_eq!(backend.count("GET", "/users"), 2);
}

#[tokio::test]
async fn test_failed_moderation_still_drops_cache() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    admin.get("/users").await;
    let resp = admin.moderate(99, "suspend").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    admin.get("/users").await;
    assert_eq!(backend.count("GET", "/users"), 2);
}

#[tokio::test]
async fn test_admin_cannot_moderate_self() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.moderate(1, "ban").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.count("PATCH", "/users/1/ban"), 0);
}

#[tokio::test]
async fn test_unknown_moderation_action() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.moderate(2, "delete").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(backend.requests().is_empty());
}

// =============================================================================
// Catalog
// =============================================================================

fn product_form(name: &str, price: &str, specifications: &str) -> Value {
    json!({
        "name": name,
        "description": "Mechanical, hot-swappable",
        "price": price,
        "stock": 7,
        "imageUrl": "https://cdn.respawn.test/keyboard.png",
        "categoryId": 3,
        "specifications": specifications
    })
}

#[tokio::test]
async fn test_product_create_update_delete() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin
        .send(
            Method::POST,
            "/products",
            Some(product_form("Keyboard", "49.99", r#"{"switchType": "brown"}"#)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], 5);
    assert_eq!(created["specifications"]["switchType"], "brown");
    assert_eq!(
        backend.requests().last().unwrap().authorization.as_deref(),
        Some("Bearer token-1")
    );

    let resp = admin
        .send(
            Method::PUT,
            "/products/5",
            Some(product_form("  Keyboard TKL ", "44.50", "{}")),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = backend.with(|state| {
        state
            .products
            .iter()
            .find(|p| p.id == ProductId::new(5))
            .cloned()
            .unwrap()
    });
    assert_eq!(stored.name, "Keyboard TKL");
    assert_eq!(stored.price.to_string(), "44.50");
    assert!(stored.specifications.is_empty());

    let resp = admin.send(Method::DELETE, "/products/5", None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(backend.count("DELETE", "/products/5"), 1);
    assert!(backend.with(|state| state.products.iter().all(|p| p.id != ProductId::new(5))));
}

#[tokio::test]
async fn test_bad_specifications_never_reach_backend() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin
        .send(
            Method::POST,
            "/products",
            Some(product_form("Keyboard", "49.99", "{not json")),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin
        .send(
            Method::PUT,
            "/products/1",
            Some(product_form("Controller", "10.00", "[1, 2]")),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(backend.requests().is_empty());
    assert_eq!(backend.with(|state| state.products.len()), 4);
}

#[tokio::test]
async fn test_missing_product_delete_is_not_found() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.send(Method::DELETE, "/products/99", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_create_update_delete() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin
        .send(
            Method::POST,
            "/categories",
            Some(json!({ "name": "Keyboards", "parentId": 3 })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], 4);
    assert_eq!(created["parentId"], 3);

    let resp = admin
        .send(
            Method::PUT,
            "/categories/4",
            Some(json!({ "name": "Mechanical keyboards", "parentId": null })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let parent = backend.with(|state| {
        state
            .categories
            .iter()
            .find(|c| c.id == CategoryId::new(4))
            .unwrap()
            .parent_id
    });
    assert_eq!(parent, None);

    let resp = admin.send(Method::DELETE, "/categories/4", None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(backend.with(|state| state.categories.len()), 3);
}

#[tokio::test]
async fn test_category_cannot_be_its_own_parent() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin
        .send(
            Method::PUT,
            "/categories/2",
            Some(json!({ "name": "Pads", "parentId": 2 })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.count("PUT", "/categories/2"), 0);
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_is_forwarded() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.upload("cover.png", "image/png", b"\x89PNG fake").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["imageUrl"], "https://cdn.respawn.test/cover.png");
    assert_eq!(body["inline"], false);

    assert_eq!(backend.count("POST", "/upload"), 1);
    let uploads = backend.with(|state| state.uploads.clone());
    assert_eq!(
        uploads,
        vec![("cover.png".to_string(), "image/png".to_string(), 9)]
    );
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let backend = MockBackend::with_fixture().await;
    let admin = Admin::signed_in(&backend).await;

    let resp = admin.upload("notes.pdf", "application/pdf", b"%PDF").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin.upload("empty.png", "image/png", b"").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(backend.requests().is_empty());
}
