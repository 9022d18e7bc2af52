//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Response bodies returned by the handlers
//!
//! # API Structure
//!
//! - **Uploads** (`POST /uploads`): Store multipart files, answer with what was written
//! - **Stored files** (`GET /files/{filename}`): Static serving of the upload directory, when enabled
//! - **Health** (`GET /healthz`): Liveness check
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with `utoipa`. API documentation is available at `/docs` when the
//! server is running.

pub mod handlers;
pub mod models;
