//! Authentication route handlers.
//!
//! Handles login, signup with OTP verification, password reset and logout.
//! Every change of signed-in identity goes through [`sign_in`] or [`logout`],
//! which also refresh or drop that user's cart badge.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use respawn_api::{
    AccessToken, ApiError, AuthResponse, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest, SignupRequest, VerifyOtpRequest,
};
use respawn_core::Email;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::routes::views::{MessageQuery, Nav, redirect_with};
use crate::state::AppState;

/// Minimum password length accepted by the signup and reset forms.
const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data. `identifier` is a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// OTP verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub email: String,
    pub otp: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    pub password: String,
    pub password_confirm: String,
}

/// `?email=` plus the usual message parameters.
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub error: Option<String>,
}

/// OTP verification page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub nav: Nav,
    pub error: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Store the signed-in user and fire the auth-changed signal.
async fn sign_in(
    state: &AppState,
    session: &Session,
    auth: AuthResponse,
) -> Result<CurrentUser, tower_sessions::session::Error> {
    let current = CurrentUser::new(&auth.user, auth.token);
    set_current_user(session, &current).await?;

    set_sentry_user(&current.id, Some(&current.email));
    state
        .cart_counts()
        .auth_changed(state.client(), current.id, Some(&current.token()))
        .await;

    tracing::info!(user_id = %current.id, "Signed in");
    Ok(current)
}

/// Shared password rules for signup and reset. Returns a message code.
fn check_new_password(password: &str, confirm: &str) -> Option<&'static str> {
    if password != confirm {
        return Some("password_mismatch");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Some("password_too_short");
    }
    None
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        nav: Nav::load(&state, None).await,
        error: query.error_text(),
        success: query.success_text(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = LoginRequest {
        identifier: form.identifier.trim().to_string(),
        password: form.password,
    };

    match state.client().login(&request).await {
        Ok(auth) => {
            if let Err(e) = sign_in(&state, &session, auth).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(ApiError::Unauthorized(_) | ApiError::NotFound(_)) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            redirect_with("/auth/login", "error", &e.user_message()).into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    SignupTemplate {
        nav: Nav::load(&state, None).await,
        error: query.error_text(),
    }
}

/// Handle signup form submission.
///
/// The backend emails a one-time code; the account is usable once the code
/// is verified on `/auth/verify`.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if let Some(code) = check_new_password(&form.password, &form.password_confirm) {
        return redirect_with("/auth/signup", "error", code).into_response();
    }

    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/auth/signup?error=invalid_email").into_response();
    };

    let request = SignupRequest {
        username: form.username.trim().to_string(),
        email: email.into_inner(),
        password: form.password,
        first_name: optional_text(form.first_name),
        last_name: optional_text(form.last_name),
    };

    match state.client().signup(&request).await {
        Ok(_) => {
            if let Err(e) = session
                .insert(session_keys::PENDING_VERIFICATION, &request.email)
                .await
            {
                tracing::warn!("Failed to remember pending verification: {}", e);
            }
            redirect_with("/auth/verify", "email", &request.email).into_response()
        }
        Err(e) => {
            tracing::warn!("Signup failed: {}", e);
            redirect_with("/auth/signup", "error", &e.user_message()).into_response()
        }
    }
}

/// Display the OTP verification page.
pub async fn verify_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<EmailQuery>,
) -> impl IntoResponse {
    let pending = session
        .get::<String>(session_keys::PENDING_VERIFICATION)
        .await
        .ok()
        .flatten();

    VerifyTemplate {
        nav: Nav::load(&state, None).await,
        email: query.email.or(pending).unwrap_or_default(),
        error: query.messages.error_text(),
        success: query
            .messages
            .success_text()
            .or_else(|| Some("We sent a verification code to your email.".to_string())),
    }
}

/// Handle OTP verification. A valid code signs the user in.
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyForm>,
) -> Response {
    let request = VerifyOtpRequest {
        email: form.email.trim().to_string(),
        otp: form.otp.trim().to_string(),
    };
    let back = format!("/auth/verify?email={}", urlencoding::encode(&request.email));

    match state.client().verify_otp(&request).await {
        Ok(auth) => {
            if let Err(e) = sign_in(&state, &session, auth).await {
                tracing::error!("Failed to set session after verification: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }
            let _ = session
                .remove::<String>(session_keys::PENDING_VERIFICATION)
                .await;
            Redirect::to("/account?success=verified").into_response()
        }
        Err(ApiError::Unauthorized(_) | ApiError::NotFound(_)) => {
            redirect_with(&back, "error", "otp").into_response()
        }
        Err(e) => {
            tracing::warn!("OTP verification failed: {}", e);
            redirect_with(&back, "error", &e.user_message()).into_response()
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        nav: Nav::load(&state, None).await,
        error: query.error_text(),
    }
}

/// Request a reset code.
///
/// The same confirmation is shown whether or not the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/auth/forgot-password?error=invalid_email").into_response();
    };

    let request = ForgotPasswordRequest {
        email: email.into_inner(),
    };

    match state.client().forgot_password(&request).await {
        Ok(_) | Err(ApiError::NotFound(_)) => {}
        Err(e) => {
            tracing::warn!("Forgot password request failed: {}", e);
            return redirect_with("/auth/forgot-password", "error", &e.user_message())
                .into_response();
        }
    }

    let target = format!(
        "/auth/reset-password?email={}",
        urlencoding::encode(&request.email)
    );
    redirect_with(&target, "success", "reset_sent").into_response()
}

/// Display the reset password page.
pub async fn reset_password_page(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        nav: Nav::load(&state, None).await,
        email: query.email.unwrap_or_default(),
        error: query.messages.error_text(),
        success: query.messages.success_text(),
    }
}

/// Handle reset password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let back = format!(
        "/auth/reset-password?email={}",
        urlencoding::encode(form.email.trim())
    );

    if let Some(code) = check_new_password(&form.password, &form.password_confirm) {
        return redirect_with(&back, "error", code).into_response();
    }

    let request = ResetPasswordRequest {
        email: form.email.trim().to_string(),
        otp: form.otp.trim().to_string(),
        new_password: form.password,
    };

    match state.client().reset_password(&request).await {
        Ok(_) => Redirect::to("/auth/login?success=password_reset").into_response(),
        Err(ApiError::Unauthorized(_)) => redirect_with(&back, "error", "otp").into_response(),
        Err(e) => {
            tracing::warn!("Password reset failed: {}", e);
            redirect_with(&back, "error", &e.user_message()).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Response {
    if let Some(user) = user {
        state
            .cart_counts()
            .auth_changed(state.client(), user.id, None::<&AccessToken>)
            .await;
        tracing::info!(user_id = %user.id, "Signed out");
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    clear_sentry_user();
    Redirect::to("/").into_response()
}
