//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use respawn_core::account::{Address, ProfileUpdate, User};
use respawn_core::checkout::missing_address_fields;
use respawn_core::{AddressId, Email};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::routes::cart::action_failed;
use crate::routes::views::{AddressView, MessageQuery, Nav, redirect_with};
use crate::state::AppState;

/// Profile display data for templates.
#[derive(Clone)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub member_since: Option<String>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            member_since: user.created_at.map(|at| at.format("%B %Y").to_string()),
        }
    }
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// New address form data.
#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    pub phone: Option<String>,
    /// Checkbox; present when ticked.
    pub is_default: Option<String>,
}

impl From<AddressForm> for Address {
    fn from(form: AddressForm) -> Self {
        Self {
            id: None,
            full_name: form.full_name.trim().to_string(),
            street: form.street.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.trim().to_string(),
            postal_code: form.postal_code.trim().to_string(),
            country: form.country.trim().to_string(),
            phone: optional_text(form.phone),
            is_default: form.is_default.is_some(),
        }
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub nav: Nav,
    pub profile: ProfileView,
    pub addresses: Vec<AddressView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display account overview page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(messages): Query<MessageQuery>,
) -> Result<AccountIndexTemplate> {
    let profile = state.client().profile(&user.token()).await?;
    let nav = Nav::load(&state, Some(&user)).await;

    Ok(AccountIndexTemplate {
        nav,
        profile: ProfileView::from(&profile),
        addresses: profile.addresses.iter().map(AddressView::from).collect(),
        error: messages.error_text(),
        success: messages.success_text(),
    })
}

/// Save profile changes.
///
/// Changed usernames and emails are checked for availability first. The
/// check is best effort: when it fails the save goes ahead and the backend
/// has the final word.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    match save_profile(&state, &user, &session, form).await {
        Ok(()) => redirect_with("/account", "success", "profile_saved").into_response(),
        Err(e) => action_failed("/account", &e),
    }
}

async fn save_profile(
    state: &AppState,
    user: &CurrentUser,
    session: &Session,
    form: ProfileForm,
) -> Result<()> {
    let username = form.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required.".to_string()));
    }
    let email = Email::parse(&form.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_string()))?
        .into_inner();

    let token = user.token();
    let username_changed = username != user.username;
    let email_changed = !email.eq_ignore_ascii_case(&user.email);

    if username_changed || email_changed {
        match state
            .client()
            .check_availability(
                Some(&token),
                username_changed.then_some(username.as_str()),
                email_changed.then_some(email.as_str()),
            )
            .await
        {
            Ok(availability) => {
                if username_changed && !availability.username_available {
                    return Err(AppError::Conflict("That username is taken.".to_string()));
                }
                if email_changed && !availability.email_available {
                    return Err(AppError::Conflict(
                        "That email is already registered.".to_string(),
                    ));
                }
            }
            Err(e) => warn!(error = %e, "Availability check failed, saving anyway"),
        }
    }

    let update = ProfileUpdate {
        username,
        email,
        first_name: optional_text(form.first_name),
        last_name: optional_text(form.last_name),
        phone: optional_text(form.phone),
    };
    let updated = state.client().update_profile(&token, &update).await?;

    // Keep the header in sync with the new username
    let current = CurrentUser::new(&updated, token.expose());
    session
        .insert(session_keys::CURRENT_USER, &current)
        .await?;
    Ok(())
}

/// Add a shipping address.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Response {
    let address = Address::from(form);

    let missing = missing_address_fields(&address);
    if !missing.is_empty() {
        let message = format!("Please fill in: {}", missing.join(", "));
        return redirect_with("/account", "error", &message).into_response();
    }

    match state.client().add_address(&user.token(), &address).await {
        Ok(_) => redirect_with("/account", "success", "address_saved").into_response(),
        Err(e) => action_failed("/account", &AppError::from(e)),
    }
}

/// Delete a shipping address.
#[instrument(skip(state, user), fields(user_id = %user.id, address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Response {
    match state.client().delete_address(&user.token(), id).await {
        Ok(()) => redirect_with("/account", "success", "address_deleted").into_response(),
        Err(e) => action_failed("/account", &AppError::from(e)),
    }
}
