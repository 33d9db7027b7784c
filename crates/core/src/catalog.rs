//! Catalog entities: products, categories and product specifications.
//!
//! Records are mirrored from backend JSON (camelCase keys). Products are
//! created and edited only through the admin back-office; everywhere else they
//! are read-only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// Free-form specification map. Keys vary per category ("cpu", "ram",
/// "platform", "switchType", ...).
pub type Specifications = BTreeMap<String, serde_json::Value>;

/// A product as returned by `GET /products` and `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Unit price in the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Render a specification value as plain text.
    #[must_use]
    pub fn spec_text(&self, key: &str) -> Option<String> {
        self.specifications.get(key).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// A category (games, PCs, laptops, accessories, ...) or one of their
/// subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

/// Product payload for admin create/update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub specifications: Specifications,
}

/// Category payload for admin create/update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
}

/// Errors raised while validating admin catalog input.
#[derive(Debug, thiserror::Error)]
pub enum CatalogInputError {
    /// Specifications text is not valid JSON.
    #[error("specifications are not valid JSON: {0}")]
    InvalidSpecifications(#[from] serde_json::Error),
    /// Specifications JSON is valid but not an object.
    #[error("specifications must be a JSON object")]
    SpecificationsNotObject,
    /// Required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// Price is zero or negative.
    #[error("price must be greater than zero")]
    NonPositivePrice,
    /// Stock is negative.
    #[error("stock cannot be negative")]
    NegativeStock,
}

/// Parse the specifications textarea of the product form.
///
/// Blank input yields an empty map.
///
/// # Errors
///
/// Returns an error if the text is not JSON or is not a JSON object.
pub fn parse_specifications(text: &str) -> Result<Specifications, CatalogInputError> {
    if text.trim().is_empty() {
        return Ok(Specifications::new());
    }

    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(CatalogInputError::SpecificationsNotObject),
    }
}

impl ProductInput {
    /// Check the fields the form enforces before submitting.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), CatalogInputError> {
        if self.name.trim().is_empty() {
            return Err(CatalogInputError::MissingField("name"));
        }
        if self.price <= Decimal::ZERO {
            return Err(CatalogInputError::NonPositivePrice);
        }
        if self.stock < 0 {
            return Err(CatalogInputError::NegativeStock);
        }
        Ok(())
    }
}

impl CategoryInput {
    /// Check the fields the form enforces before submitting.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn validate(&self) -> Result<(), CatalogInputError> {
        if self.name.trim().is_empty() {
            return Err(CatalogInputError::MissingField("name"));
        }
        Ok(())
    }
}

/// Ids of `root` and every category nested below it.
///
/// Cycles in `parent_id` links are tolerated: each category is visited once.
#[must_use]
pub fn category_with_descendants(root: CategoryId, categories: &[Category]) -> Vec<CategoryId> {
    let mut ids = vec![root];
    let mut cursor = 0;

    while let Some(&current) = ids.get(cursor) {
        for category in categories {
            if category.parent_id == Some(current) && !ids.contains(&category.id) {
                ids.push(category.id);
            }
        }
        cursor += 1;
    }

    ids
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: i64, parent: Option<i64>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("c{id}"),
            description: String::new(),
            image_url: None,
            parent_id: parent.map(CategoryId::new),
        }
    }

    #[test]
    fn test_product_deserializes_backend_json() {
        let json = r#"{
            "id": 3,
            "name": "Ryzen Tower",
            "price": 1299.99,
            "stock": 4,
            "imageUrl": "https://img.example.com/tower.png",
            "categoryId": 2,
            "specifications": {"cpu": "Ryzen 7", "ram": 32}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price.to_string(), "1299.99");
        assert_eq!(product.spec_text("cpu").as_deref(), Some("Ryzen 7"));
        assert_eq!(product.spec_text("ram").as_deref(), Some("32"));
        assert!(product.in_stock());
        assert!(product.description.is_empty());
    }

    #[test]
    fn test_parse_specifications() {
        assert!(parse_specifications("  ").unwrap().is_empty());

        let specs = parse_specifications(r#"{"platform": "PS5"}"#).unwrap();
        assert_eq!(specs.get("platform"), Some(&serde_json::json!("PS5")));

        assert!(matches!(
            parse_specifications("[1, 2]"),
            Err(CatalogInputError::SpecificationsNotObject)
        ));
        assert!(matches!(
            parse_specifications("{platform:"),
            Err(CatalogInputError::InvalidSpecifications(_))
        ));
    }

    #[test]
    fn test_product_input_validation() {
        let mut input = ProductInput {
            name: "Headset".to_string(),
            description: String::new(),
            price: Decimal::new(4999, 2),
            stock: 0,
            image_url: None,
            category_id: None,
            specifications: Specifications::new(),
        };
        assert!(input.validate().is_ok());

        input.price = Decimal::ZERO;
        assert!(matches!(input.validate(), Err(CatalogInputError::NonPositivePrice)));

        input.price = Decimal::ONE;
        input.stock = -1;
        assert!(matches!(input.validate(), Err(CatalogInputError::NegativeStock)));

        input.stock = 1;
        input.name = "  ".to_string();
        assert!(matches!(input.validate(), Err(CatalogInputError::MissingField("name"))));
    }

    #[test]
    fn test_category_with_descendants() {
        let categories = vec![
            category(1, None),
            category(2, Some(1)),
            category(3, Some(2)),
            category(4, None),
        ];
        let ids = category_with_descendants(CategoryId::new(1), &categories);
        assert_eq!(
            ids,
            vec![CategoryId::new(1), CategoryId::new(2), CategoryId::new(3)]
        );
    }

    #[test]
    fn test_category_with_descendants_tolerates_cycles() {
        let categories = vec![category(1, Some(2)), category(2, Some(1))];
        let ids = category_with_descendants(CategoryId::new(1), &categories);
        assert_eq!(ids, vec![CategoryId::new(1), CategoryId::new(2)]);
    }
}
