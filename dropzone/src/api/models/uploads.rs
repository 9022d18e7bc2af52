use crate::upload::{FormField, StoredFile, UploadedFiles};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A file stored by an upload request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredFileResponse {
    /// Multipart field the file was sent in
    pub field_name: String,
    /// Filename as sent by the client
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Directory the file was written into
    pub destination: String,
    /// Stored filename, `<epoch-millis>-<original_name>`
    pub filename: String,
    /// Full path of the stored file
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

impl From<&StoredFile> for StoredFileResponse {
    fn from(file: &StoredFile) -> Self {
        Self {
            field_name: file.field_name.clone(),
            original_name: file.original_name.clone(),
            content_type: file.content_type.clone(),
            destination: file.destination.display().to_string(),
            filename: file.filename.clone(),
            path: file.path.display().to_string(),
            size: file.size,
        }
    }
}

/// A text field sent alongside the files
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormFieldResponse {
    pub name: String,
    pub value: String,
}

impl From<&FormField> for FormFieldResponse {
    fn from(field: &FormField) -> Self {
        Self {
            name: field.name.clone(),
            value: field.value.clone(),
        }
    }
}

/// Everything received by an upload request, in body order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<StoredFileResponse>,
    pub fields: Vec<FormFieldResponse>,
}

impl From<&UploadedFiles> for UploadResponse {
    fn from(uploaded: &UploadedFiles) -> Self {
        Self {
            files: uploaded.files.iter().map(StoredFileResponse::from).collect(),
            fields: uploaded.fields.iter().map(FormFieldResponse::from).collect(),
        }
    }
}
