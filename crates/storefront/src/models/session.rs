//! Session-related types.
//!
//! Types stored in the session for authentication state. The bearer token is
//! kept here and nowhere else.

use respawn_api::AccessToken;
use respawn_core::account::User;
use respawn_core::{UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user and
/// authenticate backend calls on their behalf.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Username shown in the header.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role at sign-in time.
    pub role: UserRole,
    /// Bearer token issued by the backend.
    token: String,
}

impl CurrentUser {
    /// Build the session identity from a successful login.
    #[must_use]
    pub fn new(user: &User, token: impl Into<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            token: token.into(),
        }
    }

    /// The bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> AccessToken {
        AccessToken::new(self.token.clone())
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the email awaiting OTP verification after signup.
    pub const PENDING_VERIFICATION: &str = "pending_verification";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 3,
            "username": "player1",
            "email": "p1@example.com"
        }))
        .unwrap();
        let current = CurrentUser::new(&user, "secret-token-value");

        let debug_output = format!("{current:?}");
        assert!(debug_output.contains("player1"));
        assert!(!debug_output.contains("secret-token-value"));
        assert_eq!(current.token().expose(), "secret-token-value");
    }
}
