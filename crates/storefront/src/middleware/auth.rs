//! Signed-in user extractors.
//!
//! The session holds a [`CurrentUser`] (id, username and bearer token) once
//! login succeeds. Handlers pick [`RequireAuth`] when a page makes no sense
//! for visitors and [`OptionalAuth`] when the service layer decides.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

const LOGIN_PAGE: &str = "/auth/login";

/// Resolves to the signed-in user, or rejects.
///
/// Pages redirect to the login page; `/api/*` routes get a bare 401 so the
/// badge script can tell "signed out" apart from a failed request.
///
/// ```rust,ignore
/// async fn orders(RequireAuth(user): RequireAuth) -> String {
///     user.username
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    RedirectToLogin,
    Unauthorized,
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PAGE).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))
    }
}

/// The signed-in user, if any. Never rejects.
///
/// Services called with `None` answer `AppError::Unauthorized` themselves,
/// which keeps visitor handling in one place.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Treating unreadable session as signed out: {e}");
            None
        }
    }
}

/// Store `user` under a fresh session id so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in user. Flash messages and the rest of the session go too.
///
/// # Errors
///
/// Returns an error if the session store rejects the delete.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_depends_on_path() {
        assert_eq!(
            AuthRejection::for_path("/api/cart/count"),
            AuthRejection::Unauthorized
        );
        assert_eq!(
            AuthRejection::for_path("/account/orders"),
            AuthRejection::RedirectToLogin
        );
    }

    #[test]
    fn test_redirect_targets_login_page() {
        let response = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some(LOGIN_PAGE)
        );
    }
}
