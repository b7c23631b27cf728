//! Backend error types.

use quotedesk_core::collaborators::CollaboratorError;
use thiserror::Error;

/// Errors produced by the PostgreSQL/HTTP backends.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid credentials")]
    Credential,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for CollaboratorError {
    fn from(e: BackendError) -> Self {
        match e {
            // Structured rejections carry their reason to the UI.
            BackendError::Credential => CollaboratorError::Rejected("Invalid credentials".into()),
            BackendError::Validation(msg) => CollaboratorError::Rejected(msg),
            // Transport-level failures have no user-facing reason.
            BackendError::Db(e) => CollaboratorError::Unavailable(e.to_string()),
            BackendError::Http(msg) => CollaboratorError::Unavailable(msg),
            BackendError::Internal(msg) => CollaboratorError::Unavailable(msg),
        }
    }
}
