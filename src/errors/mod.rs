//! Error types for the DocCloud client.
//!
//! Every failure surfaced by the client is one variant of [`DocCloudError`].
//! The request executor classifies HTTP error responses exactly once; resources
//! propagate the classified error unchanged.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for DocCloud operations.
pub type DocCloudResult<T> = Result<T, DocCloudError>;

/// Closed set of error kinds produced by the DocCloud client.
#[derive(Debug, Error)]
pub enum DocCloudError {
    /// The caller supplied missing or contradictory arguments.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the offending parameter.
        message: String,
    },

    /// The service rejected the request as malformed (HTTP 400).
    #[error("Bad request (HTTP {status_code}): {message}")]
    BadRequest {
        /// Error message returned by the service.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// The service could not perform the requested conversion (HTTP 422).
    #[error("Conversion failed (HTTP {status_code}): {message}")]
    ConversionFailed {
        /// Error message returned by the service.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// The service is temporarily unavailable (HTTP 503).
    #[error("Service temporarily unavailable (HTTP {status_code}): {message}")]
    TemporaryUnavailable {
        /// Error message returned by the service.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Seconds to wait before retrying, from the `Retry-After` header.
        retry_after: Option<u64>,
    },

    /// Any other classified API error.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// Error message returned by the service.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// Unclassified transport failure, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An error response claimed to be JSON but could not be parsed.
    #[error("Parse error: {message}")]
    Parse {
        /// Error message.
        message: String,
    },

    /// Writing downloaded content to a local destination failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error message.
        message: String,
    },
}

impl DocCloudError {
    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        DocCloudError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a generic API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        DocCloudError::Api {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        DocCloudError::Parse {
            message: message.into(),
        }
    }

    /// Classifies an API error by HTTP status code.
    ///
    /// `retry_after` is only kept for 503 responses.
    pub fn from_status(status_code: u16, message: impl Into<String>, retry_after: Option<u64>) -> Self {
        let message = message.into();
        match status_code {
            400 => DocCloudError::BadRequest {
                message,
                status_code,
            },
            422 => DocCloudError::ConversionFailed {
                message,
                status_code,
            },
            503 => DocCloudError::TemporaryUnavailable {
                message,
                status_code,
                retry_after,
            },
            _ => DocCloudError::Api {
                message,
                status_code,
            },
        }
    }

    /// Returns the HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DocCloudError::BadRequest { status_code, .. }
            | DocCloudError::ConversionFailed { status_code, .. }
            | DocCloudError::TemporaryUnavailable { status_code, .. }
            | DocCloudError::Api { status_code, .. } => Some(*status_code),
            DocCloudError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Returns the retry hint of a temporary unavailability error.
    ///
    /// The client never retries on its own.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DocCloudError::TemporaryUnavailable { retry_after, .. } => {
                retry_after.map(Duration::from_secs)
            }
            _ => None,
        }
    }

    /// Returns true if repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocCloudError::TemporaryUnavailable { .. }
                | DocCloudError::Transport(TransportError::Connection { .. })
                | DocCloudError::Transport(TransportError::Timeout { .. })
        )
    }

    /// Returns the service message for classified API errors.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            DocCloudError::BadRequest { message, .. }
            | DocCloudError::ConversionFailed { message, .. }
            | DocCloudError::TemporaryUnavailable { message, .. }
            | DocCloudError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DocCloudError {
    fn from(err: std::io::Error) -> Self {
        DocCloudError::Io {
            message: err.to_string(),
        }
    }
}

/// Transport error types.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Request timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// HTTP error response whose body is not a recognized API error.
    #[error("HTTP error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Failure while reading or writing a body stream.
    #[error("Stream error: {message}")]
    Stream {
        /// Error message.
        message: String,
    },

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::InvalidRequest {
                message: err.to_string(),
            }
        } else {
            TransportError::Stream {
                message: err.to_string(),
            }
        }
    }
}
