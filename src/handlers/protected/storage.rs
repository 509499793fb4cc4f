use axum::extract::{
    multipart::{MultipartError, MultipartRejection},
    Multipart, State,
};
use axum::http::StatusCode;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, OwnerGuard};
use crate::services::UploadRequest;

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// POST /api/storage/upload - multipart form with `file` and optional `folder`.
pub async fn upload(
    _owner: OwnerGuard,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<()> {
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut request = UploadRequest::default();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty, unnamed part when no file was picked.
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                request.file_name = file_name;
                request.content_type = content_type;
                request.bytes = bytes.to_vec();
                has_file = true;
            }
            Some("folder") => {
                request.folder = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    if !has_file {
        return Err(ApiError::bad_request("No file provided"));
    }

    let asset = state.assets.upload(request).await?;
    Ok(ApiResponse::empty()
        .with_field("url", asset.url)
        .with_field("path", asset.path))
}
