use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed request, e.g. a broken multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// A file arrived in a field the upload selector does not accept
    #[error("Unexpected field: {field}")]
    UnexpectedField { field: String },

    /// Storage directory or file write failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::UnexpectedField { .. } => StatusCode::BAD_REQUEST,
            Error::Storage(_) | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking filesystem paths or other internals
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::UnexpectedField { field } => format!("Unexpected field: {field}"),
            Error::Storage(_) => "Failed to store uploaded file".to_string(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Storage(_) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::UnexpectedField { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
