//! Image upload route.
//!
//! Statement images are uploaded here before the problem itself is created;
//! the response descriptors go straight into the create-problem request.
//! The whole batch is uploaded concurrently and fails as a unit.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::post,
};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::ImageDescriptor;
use crate::models::problem::MAX_IMAGES;
use crate::services::image_service::{UploadFile, upload_all};

/// Per-file size limit (5 MB), matching the upload UI.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Whole-request body limit: five maximal files plus form overhead.
const MAX_BODY_BYTES: usize = MAX_IMAGES * MAX_IMAGE_BYTES + 1024 * 1024;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImagesResponse {
    #[schema(value_type = Vec<Object>)]
    pub images: Vec<ImageDescriptor>,
}

/// Create the images router
pub fn images_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_images))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// POST /images - Upload up to five statement images (multipart)
#[utoipa::path(
    post,
    path = "/images",
    tag = "Images",
    responses(
        (status = 201, description = "All images stored", body = UploadImagesResponse),
        (status = 400, description = "Too many files, oversized file, or non-image content"),
        (status = 502, description = "Image storage failure (no partial state is kept)")
    )
)]
pub async fn upload_images(
    State(state): State<AppState>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadImagesResponse>), ApiError> {
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            // Skip non-file form fields.
            continue;
        };

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::bad_request(format!(
                "{file_name} is not a valid image file"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read {file_name}: {e}")))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::bad_request(format!(
                "{file_name} is too large, maximum size is 5MB"
            )));
        }

        files.push(UploadFile {
            bytes: bytes.to_vec(),
            original_name: file_name,
        });

        if files.len() > MAX_IMAGES {
            return Err(ApiError::bad_request(format!(
                "at most {MAX_IMAGES} images are allowed"
            )));
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("no image files in request"));
    }

    let images = upload_all(state.images.as_ref(), files).await.map_err(|e| {
        warn!("image batch upload by {} failed: {}", auth.user_id, e);
        ApiError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(UploadImagesResponse { images })))
}
