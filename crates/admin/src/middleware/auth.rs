//! Session-backed admin identity.
//!
//! Login refuses every non-admin account, so a [`CurrentAdmin`] in the session
//! is the whole check. Backend calls still carry the admin's own token and the
//! backend re-checks the role on every mutation.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Handler argument that resolves to the signed-in admin or answers 401.
///
/// ```rust,ignore
/// async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> String {
///     admin.email
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// The session layer is not mounted on this route.
    NoSession,
    /// The session is unreadable or holds no admin.
    SignedOut,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NoSession => {
                tracing::error!("Admin route mounted without a session layer");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::SignedOut => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Admin sign-in required" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(AdminAuthRejection::NoSession);
        };

        match session.get::<CurrentAdmin>(session_keys::CURRENT_ADMIN).await {
            Ok(Some(admin)) => Ok(Self(admin)),
            Ok(None) => Err(AdminAuthRejection::SignedOut),
            Err(e) => {
                tracing::warn!("Discarding unreadable admin session: {e}");
                Err(AdminAuthRejection::SignedOut)
            }
        }
    }
}

/// Store `admin` under a fresh session id so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the whole session on logout.
///
/// # Errors
///
/// Returns an error if the session store rejects the delete.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn test_signed_out_is_json_401() {
        let response = AdminAuthRejection::SignedOut.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), 1024).await.unwrap_or_default();
        assert!(String::from_utf8_lossy(&body).contains("sign-in required"));
    }

    #[test]
    fn test_missing_layer_is_server_error() {
        let response = AdminAuthRejection::NoSession.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
