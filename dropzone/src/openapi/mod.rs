//! OpenAPI documentation configuration.
//!
//! [`UploadsApiDoc`] documents the upload endpoint and is served by Scalar at `/docs`.

pub mod uploads;

pub use uploads::UploadsApiDoc;
