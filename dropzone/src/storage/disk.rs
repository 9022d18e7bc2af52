use super::{Result, StorageError, UploadTarget};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// An open file receiving the body of one upload.
///
/// Creating a sink truncates any file already at the target path, so a colliding name means the
/// last writer wins.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
    written: u64,
}

impl FileSink {
    pub async fn create(target: &UploadTarget) -> Result<Self> {
        let path = target.path();
        let file = File::create(&path).await.map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, file, written: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await.map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush to disk and return the number of bytes written
    pub async fn finish(mut self) -> Result<u64> {
        let path = self.path;
        self.file.flush().await.map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;
        self.file
            .sync_all()
            .await
            .map_err(|source| StorageError::Write { path, source })?;
        Ok(self.written)
    }
}

/// Remove a file written earlier in a request that later failed. Best effort: failures are logged.
pub async fn remove_stored_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = ?path, "Removed partially uploaded file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove partially uploaded file"),
    }
}
