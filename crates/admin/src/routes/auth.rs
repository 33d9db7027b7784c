//! Admin sign-in and sign-out.
//!
//! Login goes through the same backend endpoint as the storefront; accounts
//! without the `ADMIN` role are refused before anything reaches the session.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use respawn_api::LoginRequest;
use respawn_core::UserId;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AdminError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub identifier: String,
    pub password: String,
}

/// The signed-in admin as returned to the client.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
        }
    }
}

/// Sign in.
#[instrument(skip_all, fields(identifier = %body.identifier))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Result<Json<AdminView>> {
    let identifier = body.identifier.trim();
    if identifier.is_empty() || body.password.is_empty() {
        return Err(AdminError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let response = state
        .client()
        .login(&LoginRequest {
            identifier: identifier.to_string(),
            password: body.password,
        })
        .await?;

    if !response.user.is_admin() {
        warn!(user_id = %response.user.id, "Non-admin login refused");
        return Err(AdminError::Forbidden(
            "This account does not have admin access".to_string(),
        ));
    }

    let admin = CurrentAdmin::new(&response.user, response.token);
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(&admin.email));
    info!(admin_id = %admin.id, "Admin signed in");

    Ok(Json(AdminView::from(&admin)))
}

/// Sign out. Always succeeds.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Who is signed in.
pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<AdminView> {
    Json(AdminView::from(&admin))
}
