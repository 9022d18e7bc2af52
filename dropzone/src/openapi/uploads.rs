//! OpenAPI documentation for the upload API.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "dropzone",
        description = "Multipart upload service. Files are written to a local directory as `<epoch-millis>-<original filename>`."
    ),
    paths(api::handlers::uploads::create_upload),
    components(schemas(
        api::models::uploads::UploadResponse,
        api::models::uploads::StoredFileResponse,
        api::models::uploads::FormFieldResponse,
    )),
    tags(
        (name = "uploads", description = "Store files sent as multipart/form-data.

- Every part with a filename is written to disk; other parts are returned as text fields
- The stored name is the original filename prefixed with the upload time in milliseconds
- Original filenames are not sanitized")
    )
)]
pub struct UploadsApiDoc;
