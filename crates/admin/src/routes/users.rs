//! User moderation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use respawn_core::account::User;
use respawn_core::{AccountStatus, ModerationAction, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ListResponse;
use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::filter::filter_users;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/{id}", get(show))
        .route("/users/{id}/{action}", post(moderate))
}

/// Query of `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub status: Option<AccountStatus>,
}

/// Result of a moderation action.
#[derive(Debug, Serialize)]
pub struct ModerationResult {
    pub id: UserId,
    pub status: AccountStatus,
}

/// List users (served from the short-lived cache).
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ListResponse<User>>> {
    let users = state.users().list(admin.id, &admin.token()).await?;
    Ok(Json(
        filter_users(&users, query.search.as_deref(), query.status).into(),
    ))
}

/// One user.
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    Ok(Json(state.users().get(admin.id, &admin.token(), id).await?))
}

/// Ban, unban, suspend or unsuspend a user.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn moderate(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path((id, action)): Path<(UserId, String)>,
) -> Result<Json<ModerationResult>> {
    let action: ModerationAction = action.parse().map_err(AdminError::BadRequest)?;
    if id == admin.id {
        return Err(AdminError::BadRequest(
            "You cannot moderate your own account".to_string(),
        ));
    }

    let status = state
        .users()
        .moderate(&admin.token(), id, action)
        .await?;
    Ok(Json(ModerationResult { id, status }))
}
