//! Test utilities for router-level tests.

use crate::config::{Config, UploadConfig};
use crate::storage::{FixedClock, StorageDirectory, TimestampResolver};
use crate::upload::{FileSelector, Uploader};
use crate::{AppState, build_router};
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test server writing into its own temporary upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub directory: PathBuf,
    /// Removes the upload directory when the test ends
    pub _temp_dir: TempDir,
}

pub fn create_test_config(directory: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        uploads: UploadConfig {
            directory: directory.to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Build the full router around an uploader whose clock is pinned to `millis`.
pub async fn create_test_app(millis: i64) -> TestApp {
    create_test_app_with_selector(millis, FileSelector::Any).await
}

pub async fn create_test_app_with_selector(millis: i64, selector: FileSelector) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let directory = StorageDirectory::ensure(temp_dir.path().join("upload"))
        .await
        .expect("Failed to create upload directory");

    let mut config = create_test_config(directory.path());
    config.uploads.files = selector.clone();

    let state = AppState::builder()
        .config(config)
        .uploader(Uploader::new(
            TimestampResolver::with_clock(directory.clone(), FixedClock(millis)),
            selector,
        ))
        .build();

    let server = TestServer::new(build_router(&state)).expect("Failed to create test server");

    TestApp {
        server,
        directory: directory.path().to_path_buf(),
        _temp_dir: temp_dir,
    }
}
