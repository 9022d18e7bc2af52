//! Storage directory management and per-file target resolution.
//!
//! Every uploaded file lands in a single [`StorageDirectory`] that is created once, at startup,
//! by [`StorageDirectory::ensure`]. For each incoming file the upload middleware asks an
//! [`UploadResolver`] where the file should go and what it should be called, producing an
//! [`UploadTarget`]. The default resolver, [`TimestampResolver`], always answers with the
//! configured directory and `<epoch-millis>-<original name>`.
//!
//! ## Known gaps
//!
//! The resolvers do not sanitize the client-supplied filename and do not detect collisions. Two
//! files with the same original name resolved within the same millisecond get the same target
//! path, and the second write replaces the first.

mod clock;
mod disk;
mod resolver;

pub use clock::{Clock, FixedClock, SystemClock};
pub use disk::{FileSink, remove_stored_file};
pub use resolver::TimestampResolver;

use axum::http::{HeaderMap, Method, Uri, request::Parts};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum StorageError {
    /// The storage directory (or one of its parents) could not be created
    #[error("Failed to create storage directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured storage path exists but is not a directory
    #[error("Storage path {path:?} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    /// Writing an uploaded file failed
    #[error("Failed to write uploaded file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// The directory all uploads are written into.
///
/// Only obtainable through [`StorageDirectory::ensure`], so holding one means the directory
/// existed when the process started. It is never removed by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDirectory {
    path: PathBuf,
}

impl StorageDirectory {
    /// Create the directory (and any missing parents) if it does not exist yet.
    ///
    /// Idempotent: calling it again for an existing directory succeeds and changes nothing.
    /// Fails if the path is taken by something that is not a directory, or if creation fails.
    pub async fn ensure(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Ok(metadata) = tokio::fs::metadata(&path).await
            && !metadata.is_dir()
        {
            return Err(StorageError::NotADirectory { path });
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::CreateDirectory { path: path.clone(), source })?;

        tracing::debug!(path = ?path, "Storage directory ready");

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Where a single uploaded file will be written. Built fresh for every file and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub directory: PathBuf,
    pub filename: String,
}

impl UploadTarget {
    /// Full path of the file: `<directory>/<filename>`
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Per-file information handed to the resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Name of the multipart field the file was sent in
    pub field_name: String,
    /// Filename as supplied by the client. Untrusted and passed through unmodified.
    pub original_name: String,
    /// Content type declared on the part, if any
    pub content_type: Option<String>,
}

/// Request-level information handed to the resolvers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }
}

/// Decides where each uploaded file is stored.
///
/// Both operations are synchronous and must not block; they are called once per file, in the
/// order files appear in the request body, before any byte of that file is written.
pub trait UploadResolver: Send + Sync + std::fmt::Debug {
    /// Directory the file should be written into
    fn resolve_destination(&self, ctx: &RequestContext, file: &FileDescriptor) -> Result<PathBuf>;

    /// Name the file should be stored under inside the destination directory
    fn resolve_filename(&self, ctx: &RequestContext, file: &FileDescriptor) -> Result<String>;

    /// Resolve destination then filename into a complete target.
    fn resolve(&self, ctx: &RequestContext, file: &FileDescriptor) -> Result<UploadTarget> {
        let directory = self.resolve_destination(ctx, file)?;
        let filename = self.resolve_filename(ctx, file)?;
        Ok(UploadTarget { directory, filename })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_creates_missing_parents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("upload");

        let directory = StorageDirectory::ensure(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(directory.path(), nested.as_path());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("upload");

        let first = StorageDirectory::ensure(&path).await.unwrap();
        std::fs::write(path.join("existing.txt"), b"keep me").unwrap();
        let second = StorageDirectory::ensure(&path).await.unwrap();

        assert_eq!(first, second);
        assert!(path.is_dir());
        // Existing contents are untouched
        assert_eq!(std::fs::read(path.join("existing.txt")).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_ensure_rejects_regular_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("upload");
        std::fs::write(&path, b"not a directory").unwrap();

        let result = StorageDirectory::ensure(&path).await;

        assert!(matches!(result, Err(StorageError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_ensure_fails_below_regular_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let result = StorageDirectory::ensure(blocker.join("upload")).await;

        assert!(matches!(result, Err(StorageError::CreateDirectory { .. })));
    }

    #[test]
    fn test_upload_target_path_joins_directory_and_filename() {
        let target = UploadTarget {
            directory: PathBuf::from("upload/"),
            filename: "1700000000000-photo.png".to_string(),
        };

        assert_eq!(target.path(), PathBuf::from("upload/1700000000000-photo.png"));
    }
}
