//! CLI command implementations.
//!
//! # Environment Variables
//!
//! - `RESPAWN_BACKEND_URL` - Origin of the REST backend
//! - `RESPAWN_TOKEN` - Bearer token (print one with `respawn-cli login`)

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use std::time::Duration;

use respawn_admin::error::AdminError;
use respawn_api::{AccessToken, ApiConfig, ApiError, BackendClient};
use thiserror::Error;
use url::Url;

use crate::output::Output;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// No backend URL given.
    #[error("Missing backend URL: pass --backend-url or set RESPAWN_BACKEND_URL")]
    MissingBackendUrl,

    /// The command needs a token and none was given.
    #[error("Not signed in: pass --token or set RESPAWN_TOKEN")]
    MissingToken,

    /// Backend call failed.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// Back-office rule rejected the action.
    #[error("{}", .0.message())]
    Admin(#[from] AdminError),

    /// Local input rejected.
    #[error("{0}")]
    Invalid(String),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a command needs: the client, the token and the output mode.
pub struct Context {
    pub client: BackendClient,
    token: Option<AccessToken>,
    pub out: Output,
}

impl Context {
    /// Build the client. The CLI is short-lived, so the catalog cache is off.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(backend_url: Url, token: Option<String>, json: bool) -> Result<Self, CliError> {
        let config = ApiConfig::new(backend_url).with_catalog_cache_ttl(Duration::ZERO);
        Ok(Self {
            client: BackendClient::new(&config)?,
            token: token
                .map(AccessToken::new)
                .filter(|token| !token.is_empty()),
            out: Output::new(json),
        })
    }

    /// The bearer token, required by every command that acts as a user.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` when none was given.
    pub fn token(&self) -> Result<&AccessToken, CliError> {
        self.token.as_ref().ok_or(CliError::MissingToken)
    }
}
