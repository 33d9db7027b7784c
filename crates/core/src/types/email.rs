//! Email address type.
//!
//! Used for account sign-up, profile edits and `PayPal` checkout details.
//! The backend stays the authority on whether an address is taken; this only
//! rejects input that cannot be an address at all.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `local@domain.tld` with no whitespace and a dotted domain.
static MAILBOX_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @")]
    AtSymbol,
    #[error("email needs text on both sides of the @")]
    MissingPart,
    #[error("email must look like name@domain.tld")]
    InvalidShape,
}

/// A trimmed email address with one `@` and text on both sides.
///
/// ```
/// use respawn_core::Email;
///
/// assert_eq!(Email::parse(" ada@respawn.store ").unwrap().as_str(), "ada@respawn.store");
/// assert!(Email::parse("ada@").is_err());
/// assert!(Email::parse_mailbox("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse the address typed into a sign-up or profile form.
    ///
    /// # Errors
    ///
    /// Returns an error for blank, overlong or malformed input.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailError::AtSymbol);
        };
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(s.to_owned()))
    }

    /// Stricter parse for payment details: the domain must contain a dot and
    /// the address no whitespace.
    ///
    /// # Errors
    ///
    /// Everything [`Email::parse`] rejects, plus [`EmailError::InvalidShape`].
    pub fn parse_mailbox(s: &str) -> Result<Self, EmailError> {
        let email = Self::parse(s)?;
        if !MAILBOX_SHAPE.is_match(&email.0) {
            return Err(EmailError::InvalidShape);
        }
        Ok(email)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for input in ["gamer@respawn.store", "first.last+tag@mail.co.uk", "a@b"] {
            assert_eq!(Email::parse(input).unwrap().as_str(), input);
        }
    }

    #[test]
    fn test_trims_input() {
        let email: Email = "  ada@respawn.store\n".parse().unwrap();
        assert_eq!(email.to_string(), "ada@respawn.store");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("a@b@c.com"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("@respawn.store"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("ada@"), Err(EmailError::MissingPart));

        let long = format!("{}@respawn.store", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: Email::MAX_LENGTH })
        );
    }

    #[test]
    fn test_mailbox_requires_dotted_domain() {
        assert!(Email::parse_mailbox("buyer@pay.example.com").is_ok());
        assert!(Email::parse_mailbox("  buyer@pay.com ").is_ok());
        assert_eq!(
            Email::parse_mailbox("buyer@localhost"),
            Err(EmailError::InvalidShape)
        );
        assert_eq!(
            Email::parse_mailbox("bu yer@pay.com"),
            Err(EmailError::InvalidShape)
        );
    }

    #[test]
    fn test_serializes_as_string() {
        let email = Email::parse("ada@respawn.store").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"ada@respawn.store\"");
    }
}
