//! Error types for feed-session
//!
//! This module provides the error taxonomy for the loader:
//! - [`RemoteError`] - transport, status and parse failures from the page API
//! - [`Error::Cancelled`] - a cancellation signal was observed (normal control flow)
//! - [`Error::Disposed`] - an operation was invoked after teardown (contract violation)
//!
//! Cancellation is a distinct variant rather than a flavor of remote failure, so
//! callers can tell "we just stopped" from "a fault occurred" with a plain match.

use thiserror::Error;

/// Result type alias for feed-session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for feed-session
#[derive(Debug, Error)]
pub enum Error {
    /// The remote page API failed (transport, HTTP status, payload)
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A cancellation signal was observed before or during the operation
    #[error("operation cancelled")]
    Cancelled,

    /// The controller has been torn down and rejects further operations
    #[error("session controller has been disposed")]
    Disposed,

    /// An operation needs a source, but none has been attached yet
    #[error("no feed source has been opened")]
    NoSource,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "paging.page_size")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Collaborator does not support the requested operation
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures reported by the remote paginated API
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP request could not be sent or the body could not be read
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success HTTP status
    #[error("remote returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The payload carried an API-level error code
    #[error("remote API error {code}: {message}")]
    Api {
        /// API status code from the payload (anything other than 200)
        code: i64,
        /// Message from the payload, if any
        message: String,
    },

    /// The payload could not be decoded
    #[error("failed to parse remote response: {0}")]
    Parse(String),

    /// A collaborator refused the request (used by substitute transports and sinks)
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Returns true when the error is the cancellation outcome rather than a fault
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Message of the innermost cause in the source chain, if there is one
    pub fn cause_message(&self) -> Option<String> {
        let mut current = std::error::Error::source(self)?;
        while let Some(next) = current.source() {
            current = next;
        }
        Some(current.to_string())
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Remote(RemoteError::Transport(_)) => "remote_transport",
            Error::Remote(RemoteError::Status { .. }) => "remote_status",
            Error::Remote(RemoteError::Api { .. }) => "remote_api",
            Error::Remote(RemoteError::Parse(_)) => "remote_parse",
            Error::Remote(RemoteError::Rejected(_)) => "remote_rejected",
            Error::Cancelled => "cancelled",
            Error::Disposed => "disposed",
            Error::NoSource => "no_source",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}
