//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for the hook endpoint. Bodies are
//! plain text terminated by a newline: a single-line message for client
//! errors, the composed failure text for execution errors.

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shellhook_core::CoreError;

use crate::auth::AuthError;
use crate::launcher::LaunchError;

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed `script` parameter (400).
    #[error("Missing script parameter or invalid script parameter")]
    BadRequest,

    /// Well-formed identifier that is not registered (404).
    #[error("Script not found")]
    NotFound,

    /// Missing or wrong token (401).
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// The script failed to run or exited non-zero (500).
    #[error(transparent)]
    Execution(#[from] LaunchError),

    /// Anything else that went wrong inside the server (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Execution(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = match &self {
            ApiError::Execution(err) => err.body(),
            other => other.to_string().into_bytes(),
        };
        body.push(b'\n');
        (
            self.status(),
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedId { .. } => ApiError::BadRequest,
            CoreError::ScriptNotFound { .. } => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}
