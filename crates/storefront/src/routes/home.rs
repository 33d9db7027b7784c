//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::views::{CategoryView, Nav, ProductView};
use crate::state::AppState;

/// How many new arrivals the home page shows.
const NEW_ARRIVALS: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductView>,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let categories = state.catalog().root_categories().await?;
    let products = state.catalog().newest(NEW_ARRIVALS).await?;

    let favorites = state.favorites().ids(user.as_ref()).await;
    let nav = Nav::load(&state, user.as_ref()).await;

    Ok(HomeTemplate {
        nav,
        categories: categories.iter().map(CategoryView::from).collect(),
        products: ProductView::list(&products, &favorites),
    })
}
