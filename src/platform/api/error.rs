//! Error types for the Dynatrace API gateway
//!
//! Transport failures and non-2xx answers are kept apart so callers can log
//! the status code of a rejected selector and move on to the next strategy.

use thiserror::Error;

/// Errors that can occur when talking to the monitoring platform
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (DNS, TLS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Platform answered with a non-2xx status
    #[error("HTTP error ({status}): {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response body was not the JSON we expected
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Status code of an HTTP error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, ApiError>;
