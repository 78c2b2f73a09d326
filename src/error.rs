use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for fallible setup paths (builder, transport).
///
/// Failures *inside* an open stream never travel through this type: they are
/// surfaced to the caller's sink as a [`StreamError`], together with the
/// partial content gathered before the failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}

/// Terminal failure reasons for one stream, delivered via `on_error`.
///
/// Malformed records are not represented here: they are dropped and
/// recovered from locally, never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// No bytes arrived within the configured inactivity window.
    #[error("stream timed out waiting for data")]
    Timeout,

    /// The connection failed below the HTTP layer.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    ServerError(u16),
}
