//! Error types used throughout the client

use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`SyrupError`], used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// DNS, connect, timeout and other transport failures - retryable
    Network,
    /// HTTP 5xx responses - retryable
    Server,
    /// Non-5xx HTTP error responses - never retried
    Client,
    /// Response body is not valid JSON
    Decode,
    /// Response was JSON but not shaped like the API promises
    Protocol,
    /// Polling was cancelled or hit its deadline
    Aborted,
    /// Invalid configuration or request construction
    Config,
}

/// Main error type for the Syrup client
#[derive(Error, Debug)]
pub enum SyrupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{method} {url} resulted in a `{status} {reason}` response")]
    Http {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase, e.g. `Internal Server Error`
        reason: String,
        /// Request method
        method: String,
        /// Request URL
        url: String,
        /// Response body, truncated
        body: String,
    },

    #[error("Unable to parse response body into JSON: {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("Job polling cancelled")]
    Cancelled,

    #[error("Job {job_id} did not finish within {timeout:?}")]
    PollTimeout {
        /// Job that was being polled
        job_id: String,
        /// Configured poll deadline
        timeout: Duration,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyrupError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Http { status, .. } if *status >= 500 => ErrorCategory::Server,
            Self::Http { .. } => ErrorCategory::Client,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::InvalidResponse(_) => ErrorCategory::Protocol,
            Self::Cancelled | Self::PollTimeout { .. } => ErrorCategory::Aborted,
            Self::Config(_) | Self::Serialization(_) | Self::Internal(_) => ErrorCategory::Config,
        }
    }

    /// Whether the transport layer may retry the request that produced this
    /// error.
    pub fn is_transient(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network | ErrorCategory::Server)
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error raised when a job creation response carries no `id`.
    pub fn invalid_response() -> Self {
        Self::InvalidResponse("Invalid response.".to_string())
    }
}

/// Result type alias for Syrup operations
pub type Result<T> = std::result::Result<T, SyrupError>;
