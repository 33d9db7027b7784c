//! Sign-in.

use respawn_api::LoginRequest;

use super::{CliError, Context};

/// Sign in and print the bearer token (or the full session in `--json`).
///
/// # Errors
///
/// Returns the backend error for bad credentials.
pub async fn login(ctx: &Context, identifier: &str, password: String) -> Result<(), CliError> {
    let identifier = identifier.trim();
    if identifier.is_empty() || password.is_empty() {
        return Err(CliError::Invalid(
            "Username and password are required".to_string(),
        ));
    }

    let response = ctx
        .client
        .login(&LoginRequest {
            identifier: identifier.to_string(),
            password,
        })
        .await?;

    tracing::info!(
        user_id = %response.user.id,
        role = %response.user.role,
        "Signed in"
    );

    let session = serde_json::json!({
        "token": response.token,
        "user": response.user,
    });
    ctx.out.emit(&session, || vec![response.token.clone()])
}
