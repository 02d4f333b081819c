use axum::Json;
use axum::extract::{Extension, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kiroku_api_types::UploadResponse;

use crate::application::identity::Identity;
use crate::application::uploads::StorageError;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AdminState;

const SOURCE: &str = "infra::http::admin::upload_thumbnail";

/// Accepts a multipart `file` field and stores it as a post thumbnail.
pub async fn upload_thumbnail(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(SOURCE, err.body_text()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(SOURCE, err.body_text()))?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::bad_request(SOURCE, "file field is required"))?;

    let uploaded = state
        .uploads
        .upload(identity.actor(), filename.as_deref(), data)
        .await
        .map_err(|err| match err {
            StorageError::Backend(_) => {
                ApiError::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
            }
            other => ApiError::from_error(SOURCE, StatusCode::BAD_REQUEST, &other),
        })?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(uploaded))))
}
