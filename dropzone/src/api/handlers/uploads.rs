use crate::api::models::uploads::UploadResponse;
use crate::errors::{Error, Result};
use crate::upload::UploadedFiles;
use axum::{Extension, Json, http::StatusCode};

#[utoipa::path(
    post,
    path = "/uploads",
    tag = "uploads",
    summary = "Upload files",
    description = "Upload one or more files as multipart/form-data. Each file is stored as `<epoch-millis>-<original filename>` \
in the server's upload directory. The original filename is used as-is.",
    request_body(
        content_type = "multipart/form-data",
        description = "Files plus optional text fields"
    ),
    responses(
        (status = 201, description = "Files stored", body = UploadResponse),
        (status = 400, description = "Malformed multipart body, unexpected file field, or not a multipart request"),
        (status = 500, description = "Failed to store uploaded file")
    )
)]
pub async fn create_upload(uploaded: Option<Extension<UploadedFiles>>) -> Result<(StatusCode, Json<UploadResponse>)> {
    let Some(Extension(uploaded)) = uploaded else {
        return Err(Error::BadRequest {
            message: "Expected a multipart/form-data request".to_string(),
        });
    };

    Ok((StatusCode::CREATED, Json(UploadResponse::from(&uploaded))))
}
