//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use respawn_core::CategoryId;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::{FilterView, ListingParams};
use crate::routes::views::{CategoryView, Nav, PageView, ProductView, SortOption};
use crate::state::AppState;

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub nav: Nav,
    pub categories: Vec<CategoryView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub nav: Nav,
    pub category: CategoryView,
    pub subcategories: Vec<CategoryView>,
    pub products: Vec<ProductView>,
    pub filter: FilterView,
    pub sort_options: Vec<SortOption>,
    pub pagination: PageView,
}

/// Display top-level categories.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<CategoriesIndexTemplate> {
    let categories = state.catalog().root_categories().await?;
    let nav = Nav::load(&state, user.as_ref()).await;

    Ok(CategoriesIndexTemplate {
        nav,
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}

/// Display a category with the products of it and its subcategories.
///
/// The `category` query parameter is ignored here; the path decides.
#[instrument(skip(state, user, params), fields(category_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<CategoryId>,
    Query(mut params): Query<ListingParams>,
) -> Result<CategoryShowTemplate> {
    params.category = None;
    let query = params.to_query(&[]);
    let page = state
        .catalog()
        .category_page(id, query.clone(), params.page())
        .await?;

    let favorites = state.favorites().ids(user.as_ref()).await;
    let nav = Nav::load(&state, user.as_ref()).await;

    Ok(CategoryShowTemplate {
        nav,
        category: CategoryView::from(&page.category),
        subcategories: page.subcategories.iter().map(CategoryView::from).collect(),
        products: ProductView::list(&page.products.items, &favorites),
        filter: FilterView::from(&params),
        sort_options: SortOption::all(query.sort),
        pagination: PageView::new(
            &page.products,
            &format!("/categories/{id}"),
            &params.base_query(),
        ),
    })
}
