//! Storefront services against the mock backend: cart badge, favorites,
//! checkout and catalog listing.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use chrono::NaiveDate;
use respawn_api::{BackendClient, LoginRequest};
use respawn_core::account::Address;
use respawn_core::cart::CartItem;
use respawn_core::catalog::category_with_descendants;
use respawn_core::checkout::{CheckoutError, PaymentDetails};
use respawn_core::listing::{ListingQuery, SortOrder};
use respawn_core::{CategoryId, OrderStatus, PaymentMethod, ProductId, UserId};
use respawn_integration_tests::{MockBackend, PASSWORD};
use respawn_storefront::error::AppError;
use respawn_storefront::models::CurrentUser;
use respawn_storefront::services::{
    CartCountRegistry, CartService, CatalogService, CheckoutService, CheckoutSource,
    FailurePolicy, FavoritesService,
};
use rust_decimal::Decimal;

const BOB: UserId = UserId::new(2);

async fn sign_in(client: &BackendClient, identifier: &str) -> CurrentUser {
    let response = client
        .login(&LoginRequest {
            identifier: identifier.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    CurrentUser::new(&response.user, response.token)
}

/// Put `(product, quantity)` lines straight into bob's backend cart.
fn seed_cart(backend: &MockBackend, lines: &[(i64, u32)]) {
    backend.with(|state| {
        let items = lines
            .iter()
            .map(|&(id, quantity)| CartItem {
                id: None,
                product: state
                    .products
                    .iter()
                    .find(|p| p.id == ProductId::new(id))
                    .cloned()
                    .unwrap(),
                quantity,
            })
            .collect();
        state.carts.insert(BOB, items);
    });
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// =============================================================================
// Cart badge
// =============================================================================

#[tokio::test]
async fn test_add_bumps_badge_by_one_line() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    let cart = CartService::new(client, CartCountRegistry::new(FailurePolicy::RetainStale));

    assert_eq!(cart.count(Some(&bob)).await.count, 0);

    let badge = cart.add(Some(&bob), ProductId::new(1), 3).await.unwrap();
    assert_eq!(badge.count, 1);
    let badge = cart.add(Some(&bob), ProductId::new(2), 1).await.unwrap();
    assert_eq!(badge.count, 2);

    let badge = cart.remove(Some(&bob), ProductId::new(2)).await.unwrap();
    assert_eq!(badge.count, 1);

    let items = backend.with(|state| state.carts.get(&BOB).cloned().unwrap());
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().quantity, 3);
}

#[tokio::test]
async fn test_failed_add_leaves_badge() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    let cart = CartService::new(client, CartCountRegistry::new(FailurePolicy::RetainStale));

    // Space Sim has no stock
    let err = cart.add(Some(&bob), ProductId::new(3), 1).await.unwrap_err();
    assert!(matches!(err, AppError::Api(_)));
    assert_eq!(cart.count(Some(&bob)).await.count, 0);
}

#[tokio::test]
async fn test_visitor_add_makes_no_backend_call() {
    let backend = MockBackend::with_fixture().await;
    let cart = CartService::new(
        backend.client(),
        CartCountRegistry::new(FailurePolicy::RetainStale),
    );

    let err = cart.add(None, ProductId::new(1), 1).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(cart.count(None).await.count, 0);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_add_is_already_pending() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    let cart = CartService::new(client, CartCountRegistry::new(FailurePolicy::RetainStale));
    backend.delay("/cart/add", Duration::from_millis(200));

    let (first, second) = tokio::join!(
        cart.add(Some(&bob), ProductId::new(1), 1),
        cart.add(Some(&bob), ProductId::new(1), 1),
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::AlreadyPending(_))));
    assert_eq!(backend.count("POST", "/cart/add"), 1);

    // The guard is released once the first add completes
    assert!(cart.add(Some(&bob), ProductId::new(1), 1).await.is_ok());
}

#[tokio::test]
async fn test_refresh_failure_retains_stale_count() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 2), (2, 1)]);

    let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
    let badge = registry.current(&client, Some((bob.id, &bob.token()))).await;
    assert_eq!(badge.count, 2);
    assert!(!badge.stale);

    backend.fail("/cart", StatusCode::SERVICE_UNAVAILABLE);
    let badge = registry.auth_changed(&client, bob.id, Some(&bob.token())).await;
    assert_eq!(badge.count, 2);
    assert!(badge.stale);

    backend.recover("/cart");
    let badge = registry.auth_changed(&client, bob.id, Some(&bob.token())).await;
    assert_eq!(badge.count, 2);
    assert!(!badge.stale);
}

#[tokio::test]
async fn test_refresh_failure_resets_to_zero() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 2), (2, 1)]);

    let registry = CartCountRegistry::new(FailurePolicy::ResetToZero);
    assert_eq!(
        registry.current(&client, Some((bob.id, &bob.token()))).await.count,
        2
    );

    backend.fail("/cart", StatusCode::SERVICE_UNAVAILABLE);
    let badge = registry.auth_changed(&client, bob.id, Some(&bob.token())).await;
    assert_eq!(badge.count, 0);
    assert!(!badge.stale);
}

#[tokio::test]
async fn test_logout_zeroes_badge() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 1)]);

    let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
    assert_eq!(
        registry.auth_changed(&client, bob.id, Some(&bob.token())).await.count,
        1
    );
    assert_eq!(registry.auth_changed(&client, bob.id, None).await.count, 0);
    assert_eq!(registry.current(&client, None).await.count, 0);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_toggle_favorite_twice_restores_state() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    let favorites = FavoritesService::new(client);
    let product = ProductId::new(4);

    let toggle = favorites.toggle(Some(&bob), product).await.unwrap();
    assert!(toggle.is_favorite);
    assert!(toggle.favorites.contains(product));

    let toggle = favorites.toggle(Some(&bob), product).await.unwrap();
    assert!(!toggle.is_favorite);
    assert!(toggle.favorites.is_empty());

    assert!(favorites.ids(Some(&bob)).await.is_empty());
    assert!(backend.with(|state| state.favorites.get(&BOB).is_none_or(|ids| ids.is_empty())));
}

#[tokio::test]
async fn test_concurrent_toggle_is_already_pending() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    let favorites = FavoritesService::new(client);
    let product = ProductId::new(4);
    backend.delay("/favorites", Duration::from_millis(200));

    let (first, second) = tokio::join!(
        favorites.toggle(Some(&bob), product),
        favorites.toggle(Some(&bob), product),
    );

    assert!(first.unwrap().is_favorite);
    assert!(matches!(second, Err(AppError::AlreadyPending(_))));
    assert_eq!(backend.count("GET", "/favorites"), 1);
    assert_eq!(
        backend.count("POST", "/favorites") + backend.count("DELETE", "/favorites/4"),
        1
    );
    assert!(backend.with(|state| state.favorites.get(&BOB).is_some_and(|ids| ids.contains(&product))));
}

#[tokio::test]
async fn test_visitor_favorites_are_empty() {
    let backend = MockBackend::with_fixture().await;
    let favorites = FavoritesService::new(backend.client());

    assert!(favorites.ids(None).await.is_empty());
    assert!(matches!(
        favorites.toggle(None, ProductId::new(1)).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(backend.requests().is_empty());
}

// =============================================================================
// Checkout
// =============================================================================

fn visa() -> PaymentDetails {
    PaymentDetails {
        method: PaymentMethod::Visa,
        card_number: "4111 1111 1111 1111".to_string(),
        card_expiry: "12/28".to_string(),
        card_cvv: "123".to_string(),
        paypal_email: String::new(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[tokio::test]
async fn test_cart_checkout_total() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 2), (2, 1)]);

    let checkout = CheckoutService::new(client, CartCountRegistry::new(FailurePolicy::RetainStale));
    let summary = checkout
        .assemble(Some(&bob), CheckoutSource::Cart)
        .await
        .unwrap();

    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.total, dec("25.50"));
    assert_eq!(
        summary.default_address.map(|a| a.city),
        Some("Springfield".to_string())
    );
}

#[tokio::test]
async fn test_place_order_clears_cart() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 2), (2, 1)]);

    let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
    let checkout = CheckoutService::new(client, registry.clone());
    let address = backend.with(|state| state.users.get(1).unwrap().addresses.first().cloned().unwrap());

    let order = checkout
        .place_order(Some(&bob), CheckoutSource::Cart, address, &visa(), today())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, dec("25.50"));
    assert_eq!(order.item_count(), 3);
    assert_eq!(backend.count("POST", "/orders"), 1);
    assert_eq!(backend.count("DELETE", "/cart"), 1);
    assert!(backend.with(|state| !state.carts.contains_key(&BOB)));
    assert_eq!(registry.counter(bob.id).await.count(), 0);
}

#[tokio::test]
async fn test_failed_cart_clear_refreshes_badge() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;
    seed_cart(&backend, &[(1, 2), (2, 1)]);
    backend.fail_method("DELETE", "/cart", StatusCode::SERVICE_UNAVAILABLE);

    let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
    let checkout = CheckoutService::new(client, registry.clone());
    let address = backend.with(|state| state.users.get(1).unwrap().addresses.first().cloned().unwrap());

    let order = checkout
        .place_order(Some(&bob), CheckoutSource::Cart, address, &visa(), today())
        .await
        .unwrap();

    assert_eq!(order.total_price, dec("25.50"));
    assert_eq!(backend.count("POST", "/orders"), 1);
    assert_eq!(backend.count("DELETE", "/cart"), 1);
    // Both lines are still in the backend cart, so the badge shows them
    assert!(backend.with(|state| state.carts.get(&BOB).is_some_and(|items| items.len() == 2)));
    let counter = registry.counter(bob.id).await;
    assert_eq!(counter.count(), 2);
    assert!(counter.is_loaded());
}

#[tokio::test]
async fn test_single_checkout_reads_current_price_through_cache() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.caching_client();
    let bob = sign_in(&client, "bob").await;
    let checkout = CheckoutService::new(
        client.clone(),
        CartCountRegistry::new(FailurePolicy::RetainStale),
    );
    let source = CheckoutSource::Single {
        product_id: ProductId::new(1),
        quantity: 2,
    };

    let summary = checkout.assemble(Some(&bob), source).await.unwrap();
    assert_eq!(summary.total, dec("20.00"));

    backend.with(|state| {
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == ProductId::new(1))
            .unwrap();
        product.price = dec("99.00");
    });

    let summary = checkout.assemble(Some(&bob), source).await.unwrap();
    assert_eq!(summary.total, dec("198.00"));
    assert_eq!(backend.count("GET", "/products/1"), 2);

    // Cached reads pick up the price checkout saw
    let product = client.product(ProductId::new(1)).await.unwrap();
    assert_eq!(product.price, dec("99.00"));
    assert_eq!(backend.count("GET", "/products/1"), 2);
}

#[tokio::test]
async fn test_incomplete_address_posts_nothing() {
    let backend = MockBackend::with_fixture().await;
    let client = backend.client();
    let bob = sign_in(&client, "bob").await;

    let checkout = CheckoutService::new(client, CartCountRegistry::new(FailurePolicy::RetainStale));
    let address = Address {
        full_name: "Bob Builder".to_string(),
        street: "1 Main St".to_string(),
        ..Address::default()
    };

    let err = checkout
        .place_order(
            Some(&bob),
            CheckoutSource::Single {
                product_id: ProductId::new(1),
                quantity: 1,
            },
            address,
            &visa(),
            today(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Checkout(CheckoutError::IncompleteAddress { .. })
    ));
    assert_eq!(backend.count("POST", "/orders"), 0);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_listing_sorted_by_price() {
    let backend = MockBackend::with_fixture().await;
    let catalog = CatalogService::new(backend.client());

    let query = ListingQuery {
        sort: SortOrder::PriceLowHigh,
        ..ListingQuery::default()
    };
    let page = catalog.listing(&query, 1).await.unwrap();
    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["USB Cable", "Controller", "Racing Game", "Space Sim"]);

    let query = ListingQuery {
        sort: SortOrder::PriceHighLow,
        in_stock_only: true,
        ..ListingQuery::default()
    };
    let page = catalog.listing(&query, 1).await.unwrap();
    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Racing Game", "Controller", "USB Cable"]);
}

#[tokio::test]
async fn test_category_filter_includes_subcategories() {
    let backend = MockBackend::with_fixture().await;
    let catalog = CatalogService::new(backend.client());
    let categories = catalog.categories().await.unwrap();

    let query = ListingQuery {
        categories: Some(category_with_descendants(CategoryId::new(1), &categories)),
        sort: SortOrder::Name,
        ..ListingQuery::default()
    };
    let page = catalog.listing(&query, 1).await.unwrap();
    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Racing Game", "Space Sim"]);
}
