//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as the failure
//! envelope `{"status":"fail","data":"<message>"}`:
//!
//! | Variant | Status |
//! |---------|--------|
//! | `InvalidInput` | 422 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Internal` | 500 |
//!
//! Server errors are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use stockroom_core::assignment::AssignmentError;

use crate::db::RepositoryError;
use crate::routes::response::Envelope;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed identifier or request body.
    #[error("{0}")]
    InvalidInput(String),

    /// Lookup or mutation matched no row.
    #[error("not found")]
    NotFound,

    /// A state precondition was not met.
    #[error("{0}")]
    Conflict(String),

    /// Storage or decode failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<AssignmentError<sqlx::Error>> for AppError {
    fn from(err: AssignmentError<sqlx::Error>) -> Self {
        match err {
            AssignmentError::Unavailable => Self::Conflict(err.to_string()),
            AssignmentError::OrderNotFound(_) => Self::NotFound,
            AssignmentError::Store(db_err) => RepositoryError::Database(db_err).into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(Envelope::fail(self.to_string()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
