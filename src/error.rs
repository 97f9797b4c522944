//! Unified error types for the pixel configuration service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup and service-level errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or replacing the pixel configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixelError {
    /// No identifier, or an empty one, was supplied.
    #[error("missing identifier")]
    MissingIdentifier,

    /// The identifier contains something other than decimal digits.
    #[error("invalid identifier format")]
    InvalidIdentifierFormat,

    /// Unexpected fault while handling the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PixelError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingIdentifier | Self::InvalidIdentifierFormat => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing identifier",
            Self::InvalidIdentifierFormat => "invalid identifier format",
            Self::Internal(_) => "server error",
        }
    }

    /// Short label used for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing_identifier",
            Self::InvalidIdentifierFormat => "invalid_format",
            Self::Internal(_) => "internal",
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for PixelError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("pixel store lock poisoned: {err}"))
    }
}

impl From<serde_json::Error> for PixelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("failed to parse request body: {err}"))
    }
}

/// JSON body for a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Caller-facing error message.
    pub error: &'static str,
}

impl IntoResponse for PixelError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
