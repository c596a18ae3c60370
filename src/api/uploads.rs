use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_upload_category;
use super::{ApiError, ApiResponse, UploadDto};
use crate::state::SharedState;

/// POST /uploads/{category}: multipart upload. The response locator is
/// what article attachments, chart CSVs, avatars and chat attachments
/// reference; the file itself is served under /uploads.
pub async fn upload_file(
    State(state): State<Arc<SharedState>>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadDto>>), ApiError> {
    let category = validate_upload_category(&category)?.to_string();

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::validation("No file in upload"))?;

    let file_name = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| "file".to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

    if bytes.is_empty() {
        return Err(ApiError::validation("Uploaded file is empty"));
    }

    let locator = state.files.store(&category, &file_name, &bytes).await?;

    tracing::info!("Stored upload: {locator} ({} bytes)", bytes.len());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UploadDto { locator })),
    ))
}
