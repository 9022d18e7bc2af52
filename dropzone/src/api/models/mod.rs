//! API response data models.
//!
//! API models are kept separate from the middleware's own types so the JSON contract can evolve
//! independently. All models are annotated with `utoipa` for the generated docs.
//!
//! - [`uploads`]: Stored files and text fields of an upload request

pub mod uploads;
