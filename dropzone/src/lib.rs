//! # dropzone: multipart upload service
//!
//! `dropzone` accepts `multipart/form-data` uploads over HTTP and writes every file part to a
//! single local directory, naming each stored file `<epoch-millis>-<original filename>`. The
//! directory is created when the application starts if it does not exist yet.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Uploads are handled by a
//! middleware rather than an extractor: [`upload::upload_middleware`] consumes the multipart body,
//! streams each accepted file to disk through [`storage`], and forwards the request to the route
//! handler with an [`upload::UploadedFiles`] extension describing what was written. Non-multipart
//! requests pass through the middleware untouched.
//!
//! Where a file goes is decided per file by an [`storage::UploadResolver`]. The default
//! [`storage::TimestampResolver`] answers with the configured directory and a timestamped name.
//! Original filenames are used verbatim, and two files with the same name stored within the same
//! millisecond overwrite each other.
//!
//! ### Request Flow
//!
//! 1. `POST /uploads` arrives with a `multipart/form-data` body
//! 2. The upload middleware checks each file part against the configured
//!    [`upload::FileSelector`], resolves its target and streams it to disk
//! 3. Text parts are collected alongside the stored files
//! 4. [`api::handlers::uploads::create_upload`] answers `201 Created` with a JSON description
//!
//! If any part fails (malformed body, unexpected field, write error), files already written for
//! that request are removed and the error is returned.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use dropzone::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = dropzone::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     dropzone::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     // Creates the upload directory
//!     let app = Application::new(config).await?;
//!
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the YAML layout and `DROPZONE_*` environment overrides.

pub mod api;
pub mod config;
pub mod errors;
pub mod openapi;
pub mod storage;
pub mod telemetry;
pub mod upload;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use openapi::UploadsApiDoc;
use storage::{StorageDirectory, TimestampResolver};
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use upload::{Uploader, upload_middleware};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared by the router.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .uploader(uploader)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub uploader: Uploader,
}

/// Build the application router with all routes and middleware.
///
/// - `POST /uploads` behind the upload middleware, with the default body limit disabled
/// - `GET /healthz`
/// - `GET /docs` for the OpenAPI reference
/// - `GET /files/{filename}` when `uploads.serve_files` is enabled
pub fn build_router(state: &AppState) -> Router {
    let upload_routes = Router::new()
        .route("/uploads", post(api::handlers::uploads::create_upload))
        .route_layer(from_fn_with_state(state.uploader.clone(), upload_middleware))
        .layer(DefaultBodyLimit::disable());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(upload_routes)
        .merge(Scalar::with_url("/docs", UploadsApiDoc::openapi()));

    if state.config.uploads.serve_files {
        debug!(directory = ?state.config.uploads.directory, "Serving stored files under /files");
        router = router.nest_service("/files", ServeDir::new(&state.config.uploads.directory));
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] creates the upload directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance, creating the upload directory if it is missing
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting dropzone with configuration: {:#?}", config);

        let directory = StorageDirectory::ensure(config.uploads.directory.clone())
            .await
            .with_context(|| format!("Failed to prepare upload directory {:?}", config.uploads.directory))?;
        info!(directory = ?directory.path(), "Upload directory ready");

        let uploader = Uploader::new(TimestampResolver::new(directory), config.uploads.files.clone());
        let state = AppState::builder().config(config.clone()).uploader(uploader).build();
        let router = build_router(&state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind to {bind_addr}"))?;
        info!(
            "dropzone listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
