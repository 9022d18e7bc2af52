//! Multipart upload middleware.
//!
//! [`Uploader`] is mounted on a route with [`axum::middleware::from_fn_with_state`] and
//! [`upload_middleware`]. For `multipart/form-data` requests it streams every accepted file part
//! to disk, at the location chosen by its [`UploadResolver`](crate::storage::UploadResolver),
//! then hands an [`UploadedFiles`] extension to the next handler. Other requests pass through
//! untouched.
//!
//! ```ignore
//! let uploader = Uploader::new(TimestampResolver::new(directory), FileSelector::single("file"));
//! let router = Router::new()
//!     .route("/uploads", post(handler))
//!     .route_layer(from_fn_with_state(uploader, upload_middleware));
//! ```

mod middleware;
mod selector;

pub use middleware::{store_multipart, upload_middleware};
pub use selector::{Admission, FieldLimit, FileSelector};

use crate::storage::UploadResolver;
use std::path::PathBuf;
use std::sync::Arc;

/// A configured upload handler: where files go and which fields may carry them.
#[derive(Debug, Clone)]
pub struct Uploader {
    resolver: Arc<dyn UploadResolver>,
    selector: FileSelector,
}

impl Uploader {
    pub fn new(resolver: impl UploadResolver + 'static, selector: FileSelector) -> Self {
        Self {
            resolver: Arc::new(resolver),
            selector,
        }
    }

    pub fn resolver(&self) -> &dyn UploadResolver {
        self.resolver.as_ref()
    }

    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }
}

/// A file written to disk during the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub field_name: String,
    pub original_name: String,
    pub content_type: Option<String>,
    pub destination: PathBuf,
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// A non-file multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Request extension inserted by [`upload_middleware`], in body order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles {
    pub files: Vec<StoredFile>,
    pub fields: Vec<FormField>,
}

impl UploadedFiles {
    /// First file received in the given field
    pub fn file(&self, field_name: &str) -> Option<&StoredFile> {
        self.files.iter().find(|file| file.field_name == field_name)
    }

    /// First value received for the given text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.name == name).map(|field| field.value.as_str())
    }
}
