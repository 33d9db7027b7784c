//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use respawn_core::catalog::{Category, category_with_descendants};
use respawn_core::listing::{ListingQuery, SortOrder};
use respawn_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::views::{
    CategoryView, MessageQuery, Nav, PageView, ProductView, SortOption,
};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Listing query parameters shared by `/products` and category pages.
///
/// Everything arrives as text because empty form fields are submitted as
/// `min=&max=`; unparsable values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl ListingParams {
    fn text(value: Option<&String>) -> Option<&str> {
        value.map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Requested page, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> usize {
        Self::text(self.page.as_ref())
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }

    /// The category filter, if one parses.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        Self::text(self.category.as_ref()).and_then(|c| c.parse().ok())
    }

    #[must_use]
    pub fn sort(&self) -> SortOrder {
        SortOrder::from_param(Self::text(self.sort.as_ref()))
    }

    /// Build the listing query. A category filter covers its subcategories.
    #[must_use]
    pub fn to_query(&self, categories: &[Category]) -> ListingQuery {
        let price = |value: Option<&String>| {
            Self::text(value).and_then(|v| v.parse::<Decimal>().ok())
        };

        ListingQuery {
            search: Self::text(self.q.as_ref()).map(String::from),
            categories: self
                .category_id()
                .map(|id| category_with_descendants(id, categories)),
            min_price: price(self.min.as_ref()),
            max_price: price(self.max.as_ref()),
            in_stock_only: Self::text(self.in_stock.as_ref()).is_some(),
            sort: self.sort(),
        }
    }

    /// Encoded query string of every set parameter except `page`.
    #[must_use]
    pub fn base_query(&self) -> String {
        [
            ("q", &self.q),
            ("category", &self.category),
            ("min", &self.min),
            ("max", &self.max),
            ("in_stock", &self.in_stock),
            ("sort", &self.sort),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            Self::text(value.as_ref()).map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}

/// Form values echoed back into the filter sidebar.
#[derive(Clone, Default)]
pub struct FilterView {
    pub q: String,
    pub category: String,
    pub min: String,
    pub max: String,
    pub in_stock: bool,
}

impl From<&ListingParams> for FilterView {
    fn from(params: &ListingParams) -> Self {
        let text = |v: Option<&String>| ListingParams::text(v).unwrap_or_default().to_string();
        Self {
            q: text(params.q.as_ref()),
            category: text(params.category.as_ref()),
            min: text(params.min.as_ref()),
            max: text(params.max.as_ref()),
            in_stock: ListingParams::text(params.in_stock.as_ref()).is_some(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub filter: FilterView,
    pub sort_options: Vec<SortOption>,
    pub pagination: PageView,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: ProductView,
    pub category: Option<CategoryView>,
    pub related: Vec<ProductView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product listing page.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<ListingParams>,
) -> Result<ProductsIndexTemplate> {
    let categories = state.catalog().categories().await?;
    let query = params.to_query(&categories);
    let page = state.catalog().listing(&query, params.page()).await?;

    let favorites = state.favorites().ids(user.as_ref()).await;
    let nav = Nav::load(&state, user.as_ref()).await;

    Ok(ProductsIndexTemplate {
        nav,
        products: ProductView::list(&page.items, &favorites),
        categories: categories.iter().map(CategoryView::from).collect(),
        filter: FilterView::from(&params),
        sort_options: SortOption::all(query.sort),
        pagination: PageView::new(&page, "/products", &params.base_query()),
    })
}

/// Display product detail page.
#[instrument(skip(state, user, messages), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(messages): Query<MessageQuery>,
) -> Result<ProductShowTemplate> {
    let detail = state.catalog().product_detail(id).await?;

    let favorites = state.favorites().ids(user.as_ref()).await;
    let nav = Nav::load(&state, user.as_ref()).await;

    Ok(ProductShowTemplate {
        nav,
        product: ProductView::new(&detail.product, &favorites),
        category: detail.category.as_ref().map(CategoryView::from),
        related: ProductView::list(&detail.related, &favorites),
        error: messages.error_text(),
        success: messages.success_text(),
    })
}
