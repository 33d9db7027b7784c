//! Catalog listing service.
//!
//! Every product list in the storefront (all products, a category, search
//! results, related products) goes through this one fetch → filter → sort →
//! paginate pipeline, parameterized by a [`ListingQuery`].

use respawn_api::BackendClient;
use respawn_core::catalog::{Category, Product, category_with_descendants};
use respawn_core::listing::{DEFAULT_PAGE_SIZE, ListingQuery, Page, SortOrder, paginate};
use respawn_core::{CategoryId, ProductId};
use tracing::instrument;

use crate::error::Result;

/// How many related products a detail page shows.
pub const RELATED_LIMIT: usize = 4;

/// A product with its surroundings.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub related: Vec<Product>,
}

/// A category page: the category, its children and the rolled-up listing.
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub category: Category,
    pub subcategories: Vec<Category>,
    pub products: Page<Product>,
}

/// Read-only catalog access.
#[derive(Clone)]
pub struct CatalogService {
    client: BackendClient,
}

impl CatalogService {
    /// Create the service.
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.client.categories().await?)
    }

    /// Top-level categories only.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn root_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories().await?;
        categories.retain(|c| c.parent_id.is_none());
        Ok(categories)
    }

    /// Filtered, sorted, paginated products.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self))]
    pub async fn listing(&self, query: &ListingQuery, page: usize) -> Result<Page<Product>> {
        let products = self.client.products().await?;
        Ok(paginate(query.apply(products), page, DEFAULT_PAGE_SIZE))
    }

    /// The newest products, for the home page.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn newest(&self, limit: usize) -> Result<Vec<Product>> {
        let query = ListingQuery {
            sort: SortOrder::Newest,
            ..ListingQuery::default()
        };
        let mut products = query.apply(self.client.products().await?);
        products.truncate(limit);
        Ok(products)
    }

    /// One product with its category and related products from the same
    /// category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` (as 404) for an unknown product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_detail(&self, id: ProductId) -> Result<ProductDetail> {
        let product = self.client.product(id).await?;

        let (category, related) = match product.category_id {
            Some(category_id) => {
                let categories = self.categories().await?;
                let category = categories.into_iter().find(|c| c.id == category_id);
                let related = self
                    .client
                    .products()
                    .await?
                    .into_iter()
                    .filter(|p| p.category_id == Some(category_id) && p.id != product.id)
                    .take(RELATED_LIMIT)
                    .collect();
                (category, related)
            }
            None => (None, Vec::new()),
        };

        Ok(ProductDetail {
            product,
            category,
            related,
        })
    }

    /// A category with its direct subcategories, listing products of the
    /// category and every descendant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` (as 404) for an unknown category.
    #[instrument(skip(self, query), fields(category_id = %id))]
    pub async fn category_page(
        &self,
        id: CategoryId,
        mut query: ListingQuery,
        page: usize,
    ) -> Result<CategoryPage> {
        let category = self.client.category(id).await?;
        let subcategories = self.client.subcategories(id).await?;
        let all = self.categories().await?;

        query.categories = Some(category_with_descendants(id, &all));
        let products = self.listing(&query, page).await?;

        Ok(CategoryPage {
            category,
            subcategories,
            products,
        })
    }
}
