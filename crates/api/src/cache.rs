//! Cache types for catalog responses.

use respawn_core::catalog::{Category, Product};
use respawn_core::{CategoryId, ProductId};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(CategoryId),
    Subcategories(CategoryId),
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Category(Box<Category>),
    Products(Vec<Product>),
    Product(Box<Product>),
}
