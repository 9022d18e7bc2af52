//! HTTP request handlers.
//!
//! File bodies never reach these handlers: the upload middleware has already written them to disk
//! and passes an [`UploadedFiles`](crate::upload::UploadedFiles) extension instead.
//!
//! - [`uploads`]: Report the files stored for a multipart request

pub mod uploads;
