use anyhow::Context;
use tracing::warn;

use shared::types::user::Image;

use crate::AppState;
use crate::database::utils::get_timestamp_millis;
use crate::error::ApiError;
use crate::handlers::http::utils::form::UploadedFile;
use crate::media::ImageUpload;

/// Validate an uploaded file as an image and push it to the media store.
pub async fn store_upload(
    state: &AppState,
    file: UploadedFile,
    folder: &str,
) -> Result<Image, ApiError> {
    let image = ImageUpload::new(
        &file.filename,
        &file.content_type,
        file.bytes,
        get_timestamp_millis(),
    )
    .map_err(|e| {
        warn!("Rejected upload '{}': {:?}", file.filename, e);
        ApiError::validation(e.to_string())
    })?;

    let stored = state
        .media
        .upload(image, folder)
        .await
        .context("Image upload failed")?;

    Ok(stored.into())
}
