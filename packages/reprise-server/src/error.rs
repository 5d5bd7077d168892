//! Error types for the order service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reprise_types::{ApiEnvelope, RepriseError};
use std::fmt;

/// Service error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Snapshot read/write failure.
    Storage(String),
    /// Business rule rejected the request.
    Domain(RepriseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
            Error::Domain(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<RepriseError> for Error {
    fn from(err: RepriseError) -> Self {
        Error::Domain(err)
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Domain(err) => match err {
                RepriseError::InvalidInput(_) | RepriseError::InvalidState(_) => {
                    StatusCode::BAD_REQUEST
                }
                RepriseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                RepriseError::Forbidden(_) => StatusCode::FORBIDDEN,
                RepriseError::NotFound(_) => StatusCode::NOT_FOUND,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        // Domain messages are user-facing; internal details stay in the logs.
        let message = match &self {
            Error::Domain(err) => err.message().to_string(),
            Error::Config(_) | Error::Storage(_) => "Internal error".to_string(),
        };
        (status, Json(ApiEnvelope::<()>::err(message))).into_response()
    }
}
