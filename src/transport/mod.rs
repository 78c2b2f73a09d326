//! Transport abstraction consumed by the stream consumer.
//!
//! The consumer depends on exactly one capability: a cumulative,
//! re-readable view of the response body received so far. The HTTP
//! implementation lives in [`http`]; tests and alternate transports only
//! need to implement [`CumulativeBody`].

pub mod http;

pub use http::{HttpBody, HttpTransport};

use crate::error::StreamError;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Collapse transport failures into the reasons surfaced to callers.
    pub fn to_stream_error(&self) -> StreamError {
        match self {
            TransportError::Status(status) => StreamError::ServerError(*status),
            TransportError::Http(err) if err.is_timeout() => StreamError::Timeout,
            other => StreamError::NetworkFailure(other.to_string()),
        }
    }
}

/// Cumulative view of a streaming response body.
///
/// `received` returns everything delivered so far and is re-readable at any
/// time. Implementations are free to redeliver overlapping snapshots; the
/// session's offset bookkeeping upstream guarantees every byte is parsed at
/// most once.
#[async_trait]
pub trait CumulativeBody: Send {
    /// Wait until the body has grown or ended. `Ok(true)` means more bytes
    /// are available through [`CumulativeBody::received`]; `Ok(false)` means
    /// the transport reached end-of-stream.
    async fn wait_for_more(&mut self) -> Result<bool, TransportError>;

    /// The entire body received so far.
    fn received(&self) -> &[u8];
}
