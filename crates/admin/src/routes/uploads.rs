//! Image uploads for product and category forms.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use respawn_api::ImageRef;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Build the uploads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Response of `POST /uploads`: a value for the form's `imageUrl` field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub image_url: String,
    pub inline: bool,
}

/// Whether a content type is an image the store can display.
fn is_image(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/png" | "image/jpeg" | "image/gif" | "image/webp" | "image/avif"
    )
}

/// Forward the `image` part of a multipart body to the backend.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AdminError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_image(&content_type) {
            return Err(AdminError::BadRequest(format!(
                "Unsupported image type: {content_type}"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AdminError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AdminError::BadRequest("Uploaded file is empty".to_string()));
        }

        let image = state
            .client()
            .upload_image(&admin.token(), &file_name, &content_type, bytes.to_vec())
            .await?;
        let inline = matches!(image, ImageRef::Inline { .. });
        info!(file_name = %file_name, inline, "Image uploaded");

        return Ok(Json(UploadResult {
            image_url: image.as_image_url(),
            inline,
        }));
    }

    Err(AdminError::BadRequest("Missing image field".to_string()))
}
