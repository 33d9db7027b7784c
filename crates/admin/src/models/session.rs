//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use respawn_api::AccessToken;
use respawn_core::UserId;
use respawn_core::account::User;
use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the signed-in admin and
/// authenticate backend calls on their behalf.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: String,
    /// Admin's display name.
    pub name: String,
    /// Bearer token issued by the backend.
    token: String,
}

impl CurrentAdmin {
    /// Build the session identity from a successful login.
    #[must_use]
    pub fn new(user: &User, token: impl Into<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name(),
            token: token.into(),
        }
    }

    /// The bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> AccessToken {
        AccessToken::new(self.token.clone())
    }
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current signed-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "username": "root",
            "email": "ops@respawn.store",
            "role": "ADMIN"
        }))
        .unwrap();
        let admin = CurrentAdmin::new(&user, "admin-token");

        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("ops@respawn.store"));
        assert!(!debug_output.contains("admin-token"));
        assert_eq!(admin.token().expose(), "admin-token");
    }
}
