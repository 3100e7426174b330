// ABOUTME: Error types for the salt-api client.
// ABOUTME: Separates transport, HTTP status, and response-shape failures.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("TLS setup failed: {0}")]
    TlsSetup(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error {status}")]
    HttpStatus { status: u16 },

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Endpoint or TLS configuration is unusable; no request was sent.
    Configuration,
    /// The network call could not complete.
    Transport,
    /// The server answered with a status other than 200.
    HttpStatus,
    /// The response body did not have the expected shape.
    Protocol,
}

impl ApiError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::InvalidEndpoint { .. } | ApiError::TlsSetup(_) => {
                ApiErrorKind::Configuration
            }
            ApiError::Transport(_) | ApiError::Timeout(_) => ApiErrorKind::Transport,
            ApiError::HttpStatus { .. } => ApiErrorKind::HttpStatus,
            ApiError::Protocol(_) => ApiErrorKind::Protocol,
        }
    }

    /// Returns the status code if the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        ApiError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
