//! Request and response bodies that only exist on the wire.
//!
//! Domain entities (products, carts, orders, users) live in `respawn-core`;
//! this module holds the auth payloads and small envelopes around them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use respawn_core::account::User;
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /auth/login`. `identifier` is a username or an email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Successful login or OTP verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Plain `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /auth/verify-otp`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Body of `POST /auth/forgot-password`.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

// =============================================================================
// Uploads
// =============================================================================

/// Response of `POST /upload`.
///
/// Depending on the storage backend the server answers with a hosted URL or
/// with the image inlined as base64.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Where a product or category image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Hosted by the image store.
    Hosted(String),
    /// Carried inline as base64.
    Inline { content_type: String, data: String },
}

impl ImageRef {
    /// Inline raw image bytes.
    #[must_use]
    pub fn inline(content_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Inline {
            content_type: content_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Normalize a value typed into an image field: `http(s)://` URLs stay
    /// hosted, `data:` URLs become inline, everything else is rejected.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/') {
            return Some(Self::Hosted(value.to_string()));
        }

        let rest = value.strip_prefix("data:")?;
        let (content_type, data) = rest.split_once(";base64,")?;
        STANDARD.decode(data).ok()?;
        Some(Self::Inline {
            content_type: content_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Value stored in `imageUrl` and usable as an `<img src>`.
    #[must_use]
    pub fn as_image_url(&self) -> String {
        match self {
            Self::Hosted(url) => url.clone(),
            Self::Inline { content_type, data } => format!("data:{content_type};base64,{data}"),
        }
    }

    /// Decoded bytes of an inline image.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Hosted(_) => None,
            Self::Inline { data, .. } => STANDARD.decode(data).ok(),
        }
    }
}

impl UploadResponse {
    /// Normalize the upload answer into an [`ImageRef`].
    #[must_use]
    pub fn into_image_ref(self) -> Option<ImageRef> {
        if let Some(url) = self.url.filter(|u| !u.is_empty()) {
            return Some(ImageRef::Hosted(url));
        }
        let data = self.data.filter(|d| !d.is_empty())?;
        // Some backends already send a full data URL
        if data.starts_with("data:") {
            return ImageRef::parse(&data);
        }
        Some(ImageRef::Inline {
            content_type: self
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            data,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_password_serializes_camel_case() {
        let body = ResetPasswordRequest {
            email: "a@b.co".to_string(),
            otp: "123456".to_string(),
            new_password: "hunter22".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["newPassword"], "hunter22");
    }

    #[test]
    fn test_image_ref_parse() {
        assert_eq!(
            ImageRef::parse(" https://cdn.example.com/a.png "),
            Some(ImageRef::Hosted("https://cdn.example.com/a.png".to_string()))
        );

        let inline = ImageRef::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(inline.bytes().unwrap(), b"hello");
        assert_eq!(inline.as_image_url(), "data:image/png;base64,aGVsbG8=");

        assert!(ImageRef::parse("data:image/png;base64,***").is_none());
        assert!(ImageRef::parse("ftp://nope").is_none());
    }

    #[test]
    fn test_upload_response_prefers_url() {
        let response = UploadResponse {
            url: Some("https://cdn.example.com/x.jpg".to_string()),
            data: Some("aGVsbG8=".to_string()),
            content_type: None,
        };
        assert_eq!(
            response.into_image_ref(),
            Some(ImageRef::Hosted("https://cdn.example.com/x.jpg".to_string()))
        );

        let response = UploadResponse {
            url: None,
            data: Some("aGVsbG8=".to_string()),
            content_type: Some("image/jpeg".to_string()),
        };
        assert_eq!(
            response.into_image_ref().unwrap().as_image_url(),
            "data:image/jpeg;base64,aGVsbG8="
        );

        assert!(UploadResponse::default().into_image_ref().is_none());
    }

    #[test]
    fn test_inline_encodes() {
        let image = ImageRef::inline("image/png", b"hello");
        assert_eq!(
            image,
            ImageRef::Inline {
                content_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string()
            }
        );
    }
}
