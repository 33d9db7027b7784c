//! Errors returned by the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// 401 or 403: missing, expired or insufficient token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429, with the `Retry-After` value in seconds.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request needs a token and none is stored.
    #[error("Not signed in")]
    MissingToken,

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered with something the client cannot use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether the error means the caller has to sign in (again).
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::MissingToken)
    }

    /// Message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::NotFound(message) if !message.is_empty() => {
                message.clone()
            }
            Self::Unauthorized(_) | Self::MissingToken => "Please sign in to continue".to_string(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 409,
            message: "Username taken".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 409: Username taken");

        let err = ApiError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }

    #[test]
    fn test_user_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.user_message(), "Out of stock");
        assert_eq!(ApiError::MissingToken.user_message(), "Please sign in to continue");
        assert!(ApiError::MissingToken.is_auth());
        assert!(!ApiError::NotFound("x".to_string()).is_auth());
    }
}
