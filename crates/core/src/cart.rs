//! Cart items and favorite sets.
//!
//! Both are held server-side per user by the backend; these are the mirrored
//! copies a request works with.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CartItemId, ProductId};

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Backend row id, when the backend exposes one.
    #[serde(default)]
    pub id: Option<CartItemId>,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The authenticated user's cart as returned by `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Number of lines in the cart. This is what the cart badge shows.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the product already has a line in the cart.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product.id == product_id)
    }
}

/// Request body for `POST /cart/add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The set of product ids the current user marked as favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<ProductId>);

impl FavoriteSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether the product is a favorite.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.contains(&product_id)
    }

    /// Add a product; returns `false` if it was already present.
    pub fn insert(&mut self, product_id: ProductId) -> bool {
        self.0.insert(product_id)
    }

    /// Remove a product; returns `false` if it was not present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.0.remove(&product_id)
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ProductId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, price: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("p{id}"),
            "price": price,
        }))
        .unwrap()
    }

    #[test]
    fn test_cart_counts() {
        let cart = Cart {
            items: vec![
                CartItem {
                    id: None,
                    product: product(1, "10"),
                    quantity: 2,
                },
                CartItem {
                    id: None,
                    product: product(2, "5.5"),
                    quantity: 1,
                },
            ],
        };
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert!(cart.contains(ProductId::new(2)));
        assert!(!cart.contains(ProductId::new(3)));
        assert_eq!(cart.items[0].line_total(), Decimal::from(20));
    }

    #[test]
    fn test_cart_missing_items_is_empty() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert_eq!(cart.line_count(), 0);
    }

    #[test]
    fn test_favorite_set_insert_remove() {
        let mut favorites = FavoriteSet::new();
        assert!(favorites.insert(ProductId::new(4)));
        assert!(!favorites.insert(ProductId::new(4)));
        assert!(favorites.contains(ProductId::new(4)));
        assert!(favorites.remove(ProductId::new(4)));
        assert!(favorites.is_empty());
    }
}
