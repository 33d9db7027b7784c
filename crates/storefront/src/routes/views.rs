//! Display data shared by several templates.

use axum::response::Redirect;
use respawn_core::account::Address;
use respawn_core::cart::FavoriteSet;
use respawn_core::catalog::{Category, Product};
use respawn_core::listing::{Page, SortOrder};
use serde::Deserialize;

use crate::models::CurrentUser;
use crate::services::CartCount;
use crate::state::AppState;

/// Header data: who is signed in and the cart badge.
#[derive(Clone, Default)]
pub struct Nav {
    pub username: Option<String>,
    pub cart_count: usize,
    /// The badge shows the last known count because a refresh failed.
    pub cart_stale: bool,
}

impl Nav {
    /// Build the header for a request, loading the badge on first use.
    pub async fn load(state: &AppState, user: Option<&CurrentUser>) -> Self {
        let CartCount { count, stale } = state.cart().count(user).await;
        Self {
            username: user.map(|u| u.username.clone()),
            cart_count: count,
            cart_stale: stale,
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub stock: i32,
    pub in_stock: bool,
    pub is_favorite: bool,
    pub specifications: Vec<(String, String)>,
}

impl ProductView {
    /// Build from a product, marking it if it is a favorite.
    #[must_use]
    pub fn new(product: &Product, favorites: &FavoriteSet) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.unit_price().display(),
            image_url: product.image_url.clone().filter(|u| !u.is_empty()),
            stock: product.stock,
            in_stock: product.in_stock(),
            is_favorite: favorites.contains(product.id),
            specifications: product
                .specifications
                .keys()
                .filter_map(|key| product.spec_text(key).map(|value| (key.clone(), value)))
                .collect(),
        }
    }

    /// Build a list.
    #[must_use]
    pub fn list(products: &[Product], favorites: &FavoriteSet) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, favorites)).collect()
    }
}

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone().filter(|u| !u.is_empty()),
        }
    }
}

/// Address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.map(|id| id.to_string()).unwrap_or_default(),
            full_name: address.full_name.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone().unwrap_or_default(),
            is_default: address.is_default,
        }
    }
}

/// Pagination links for a listing.
#[derive(Clone)]
pub struct PageView {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl PageView {
    /// Links keep every other query parameter; `base_query` is the
    /// already-encoded query without `page`.
    #[must_use]
    pub fn new<T>(page: &Page<T>, path: &str, base_query: &str) -> Self {
        let link = |n: usize| {
            if base_query.is_empty() {
                format!("{path}?page={n}")
            } else {
                format!("{path}?{base_query}&page={n}")
            }
        };
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            previous_url: page.has_previous().then(|| link(page.page - 1)),
            next_url: page.has_next().then(|| link(page.page + 1)),
        }
    }
}

/// A `<select>` option for the sort dropdown.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SortOption {
    /// Every sort order, with `current` selected.
    #[must_use]
    pub fn all(current: SortOrder) -> Vec<Self> {
        SortOrder::ALL
            .iter()
            .map(|sort| Self {
                value: sort.as_param(),
                label: sort.label(),
                selected: *sort == current,
            })
            .collect()
    }
}

/// `?error=` / `?success=` parameters carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Error text to display, if any.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.error.as_deref().map(flash_message)
    }

    /// Success text to display, if any.
    #[must_use]
    pub fn success_text(&self) -> Option<String> {
        self.success.as_deref().map(flash_message)
    }
}

/// Redirect to `path` with one encoded `key=value` message parameter.
#[must_use]
pub fn redirect_with(path: &str, key: &str, value: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(value)
    ))
}

/// A same-site path to return to after a form post, or `fallback`.
///
/// Only absolute paths are accepted so a form cannot bounce the visitor to
/// another host.
#[must_use]
pub fn return_path<'a>(requested: Option<&'a str>, fallback: &'a str) -> &'a str {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => fallback,
    }
}

/// Human-readable text for a `?error=` / `?success=` code.
///
/// Unknown codes are shown as-is, which is how backend messages are passed.
#[must_use]
pub fn flash_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid username/email or password.",
        "session" => "Your session could not be saved. Please try again.",
        "password_mismatch" => "Passwords do not match.",
        "password_too_short" => "Password must be at least 8 characters.",
        "invalid_email" => "Please enter a valid email address.",
        "otp" => "That code is invalid or has expired.",
        "code_sent" => "We sent a verification code to your email.",
        "reset_sent" => "If an account exists for that email, a reset code is on its way.",
        "password_reset" => "Your password was reset. You can sign in now.",
        "verified" => "Your account is verified.",
        "profile_saved" => "Profile saved.",
        "address_saved" => "Address added.",
        "address_deleted" => "Address removed.",
        "order_cancelled" => "Order cancelled.",
        "cart_cleared" => "Your cart is empty now.",
        "pending" => "That action is already in progress.",
        "added" => "Added to cart.",
        "favorites_updated" => "Favorites updated.",
        "order_placed" => "Thanks! Your order has been placed.",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use respawn_core::ProductId;
    use respawn_core::listing::paginate;

    use super::*;

    #[test]
    fn test_page_links() {
        let page = paginate((0..30).collect::<Vec<_>>(), 2, 12);
        let view = PageView::new(&page, "/products", "sort=name");
        assert_eq!(view.previous_url.as_deref(), Some("/products?sort=name&page=1"));
        assert_eq!(view.next_url.as_deref(), Some("/products?sort=name&page=3"));

        let page = paginate(vec![1], 1, 12);
        let view = PageView::new(&page, "/products", "");
        assert!(view.previous_url.is_none());
        assert!(view.next_url.is_none());
    }

    #[test]
    fn test_product_view_marks_favorite() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Controller",
            "price": "49.9",
            "stock": 0,
            "specifications": {"wireless": true, "color": "black"}
        }))
        .unwrap();
        let favorites: FavoriteSet = [ProductId::new(5)].into_iter().collect();

        let view = ProductView::new(&product, &favorites);
        assert_eq!(view.price, "$49.90");
        assert!(view.is_favorite);
        assert!(!view.in_stock);
        assert_eq!(
            view.specifications,
            vec![
                ("color".to_string(), "black".to_string()),
                ("wireless".to_string(), "true".to_string())
            ]
        );
    }

    #[test]
    fn test_return_path_rejects_other_hosts() {
        assert_eq!(return_path(Some("/products/4"), "/cart"), "/products/4");
        assert_eq!(return_path(Some("//evil.example"), "/cart"), "/cart");
        assert_eq!(return_path(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(return_path(None, "/cart"), "/cart");
    }

    #[test]
    fn test_message_query_text() {
        let query = MessageQuery {
            error: Some("otp".to_string()),
            success: None,
        };
        assert_eq!(
            query.error_text().as_deref(),
            Some("That code is invalid or has expired.")
        );
        assert!(query.success_text().is_none());
    }

    #[test]
    fn test_flash_message_passes_unknown_text() {
        assert_eq!(flash_message("password_mismatch"), "Passwords do not match.");
        assert_eq!(flash_message("Username taken"), "Username taken");
    }
}
