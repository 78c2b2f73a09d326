//! 流式消费模块：增量读取回答流并按记录转发内容增量。
//!
//! # Stream Consumer
//!
//! Owns the live connection for one streaming request. On every delivery
//! event it re-reads the cumulative response body, slices off only the bytes
//! it has not yet seen, decodes `data: `-framed records, and forwards each
//! content delta to the caller's sink immediately.
//!
//! ## Guarantees
//!
//! - Every byte of the body is parsed at most once, even if the transport
//!   redelivers overlapping snapshots (offset slicing, [`StreamSession`]).
//! - Deltas arrive in wire order; no reordering or coalescing.
//! - Exactly one terminal callback (`on_done` / `on_error`) per stream, and
//!   none at all after [`StreamHandle::cancel`].
//! - An inactivity timeout (default 60 s) tears the stream down with
//!   `StreamError::Timeout`; the partial text is handed back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamblocks::{FnSink, StreamConsumer};
//! use serde_json::json;
//!
//! # async fn run() -> streamblocks::Result<()> {
//! let consumer = StreamConsumer::builder().api_key("sk-...").build()?;
//! let sink = FnSink::new(
//!     |delta| print!("{delta}"),
//!     |full| println!("\n-- done ({} chars)", full.len()),
//!     |err, partial| eprintln!("failed after {} chars: {err}", partial.len()),
//! );
//! let handle = consumer.open(
//!     "https://api.example.com/v1/chat/completions",
//!     json!({"model": "gpt-4o-mini", "stream": true}),
//!     sink,
//! );
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```

mod record;
pub mod session;

pub use session::{SessionState, StreamSession};

use crate::error::StreamError;
use crate::transport::{CumulativeBody, HttpTransport};
use record::{Record, RecordStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Caller-supplied callbacks for one stream.
///
/// `on_delta` fires once per content record, in wire order, before the next
/// record is examined. Exactly one of `on_done` / `on_error` fires per
/// stream; `on_error` carries the partial text gathered before the failure.
pub trait StreamSink: Send + 'static {
    fn on_delta(&mut self, delta: &str);
    fn on_done(&mut self, full_text: String);
    fn on_error(&mut self, reason: StreamError, partial: String);
}

/// Closure adapter for [`StreamSink`].
pub struct FnSink<D, F, E> {
    on_delta: D,
    on_done: F,
    on_error: E,
}

impl<D, F, E> FnSink<D, F, E>
where
    D: FnMut(&str) + Send + 'static,
    F: FnMut(String) + Send + 'static,
    E: FnMut(StreamError, String) + Send + 'static,
{
    pub fn new(on_delta: D, on_done: F, on_error: E) -> Self {
        Self {
            on_delta,
            on_done,
            on_error,
        }
    }
}

impl<D, F, E> StreamSink for FnSink<D, F, E>
where
    D: FnMut(&str) + Send + 'static,
    F: FnMut(String) + Send + 'static,
    E: FnMut(StreamError, String) + Send + 'static,
{
    fn on_delta(&mut self, delta: &str) {
        (self.on_delta)(delta)
    }

    fn on_done(&mut self, full_text: String) {
        (self.on_done)(full_text)
    }

    fn on_error(&mut self, reason: StreamError, partial: String) {
        (self.on_error)(reason, partial)
    }
}

/// Builder for [`StreamConsumer`].
///
/// Keep this surface small; connection tuning is env-driven (see
/// [`crate::transport::HttpTransport`]).
pub struct ConsumerBuilder {
    api_key: Option<String>,
    default_headers: Vec<(String, String)>,
    idle_timeout: Duration,
}

impl ConsumerBuilder {
    pub fn new() -> Self {
        let idle_timeout = std::env::var("STREAMBLOCKS_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);
        Self {
            api_key: None,
            default_headers: Vec::new(),
            idle_timeout,
        }
    }

    /// Bearer token sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Extra header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Overall-inactivity timeout. The stream fails with
    /// [`StreamError::Timeout`] when no bytes arrive for this long.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn build(self) -> crate::Result<StreamConsumer> {
        let transport = HttpTransport::new(self.api_key, self.default_headers)?;
        Ok(StreamConsumer {
            transport: Arc::new(transport),
            idle_timeout: self.idle_timeout,
        })
    }
}

impl Default for ConsumerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens streaming requests and drives them on background tasks.
///
/// One consumer may serve many concurrent sessions; sessions share nothing
/// but the HTTP connection pool.
pub struct StreamConsumer {
    transport: Arc<HttpTransport>,
    idle_timeout: Duration,
}

/// Handle to one in-flight stream.
pub struct StreamHandle {
    cancelled: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl StreamHandle {
    /// Abort the stream. Safe to call at any time, including after
    /// completion or failure (idempotent no-op); no callback fires after
    /// this returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl StreamConsumer {
    pub fn builder() -> ConsumerBuilder {
        ConsumerBuilder::new()
    }

    /// Open a streaming request against `endpoint` and forward deltas to
    /// `sink`. Returns immediately; callbacks run on a background task.
    pub fn open<S: StreamSink>(
        &self,
        endpoint: impl Into<String>,
        payload: serde_json::Value,
        sink: S,
    ) -> StreamHandle {
        let endpoint = endpoint.into();
        let session = StreamSession::new(endpoint.clone(), payload);
        let transport = self.transport.clone();
        let idle_timeout = self.idle_timeout;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let task = tokio::spawn(async move {
            let request_id = uuid::Uuid::new_v4().to_string();
            tracing::debug!(%endpoint, %request_id, "opening response stream");

            let mut session = session;
            let mut sink = sink;
            let opened = transport
                .open_stream(&endpoint, session.payload(), &request_id)
                .await;
            match opened {
                Ok(body) => drive(body, session, sink, idle_timeout, flag).await,
                Err(err) => {
                    let reason = err.to_stream_error();
                    if let Some(partial) = session.fail(reason.clone()) {
                        if !flag.load(Ordering::SeqCst) {
                            sink.on_error(reason, partial);
                        }
                    }
                }
            }
        });

        StreamHandle { cancelled, task }
    }

    /// Drive an already-established body through the same record pipeline.
    /// This is how alternate transports plug in; only the cumulative-read
    /// semantics of [`CumulativeBody`] are required.
    pub fn open_body<B, S>(&self, session: StreamSession, body: B, sink: S) -> StreamHandle
    where
        B: CumulativeBody + 'static,
        S: StreamSink,
    {
        let idle_timeout = self.idle_timeout;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = tokio::spawn(drive(body, session, sink, idle_timeout, flag));
        StreamHandle { cancelled, task }
    }
}

/// The consumer loop: wait for growth, slice the unseen suffix, decode
/// records, forward deltas. Runs until a terminal condition.
async fn drive<B: CumulativeBody, S: StreamSink>(
    mut body: B,
    mut session: StreamSession,
    mut sink: S,
    idle_timeout: Duration,
    cancelled: Arc<AtomicBool>,
) {
    let started = Instant::now();
    let mut stats = RecordStats::default();

    loop {
        if cancelled.load(Ordering::SeqCst) {
            return;
        }

        let grew = match tokio::time::timeout(idle_timeout, body.wait_for_more()).await {
            Err(_) => {
                if let Some(partial) = session.fail(StreamError::Timeout) {
                    tracing::warn!(
                        idle_secs = idle_timeout.as_secs(),
                        received = session.processed_offset(),
                        "stream idle timeout; returning partial content"
                    );
                    if !cancelled.load(Ordering::SeqCst) {
                        sink.on_error(StreamError::Timeout, partial);
                    }
                }
                return;
            }
            Ok(Err(err)) => {
                let reason = err.to_stream_error();
                if let Some(partial) = session.fail(reason.clone()) {
                    if !cancelled.load(Ordering::SeqCst) {
                        sink.on_error(reason, partial);
                    }
                }
                return;
            }
            Ok(Ok(grew)) => grew,
        };

        // Drain whatever is new, even on the EOF pass: some bodies report
        // growth and end-of-stream in separate calls, some in one.
        let records = {
            let new_bytes = session.take_new(body.received());
            record::parse_records(new_bytes, &mut stats)
        };

        for rec in records {
            match rec {
                Record::Delta(delta) => {
                    session.push_delta(&delta);
                    if cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    sink.on_delta(&delta);
                }
                Record::Done => {
                    finish(&mut session, &mut sink, &stats, started, &cancelled);
                    return;
                }
            }
        }

        if !grew {
            // Connection closed without a [DONE] sentinel: also a clean end.
            finish(&mut session, &mut sink, &stats, started, &cancelled);
            return;
        }
    }
}

fn finish<S: StreamSink>(
    session: &mut StreamSession,
    sink: &mut S,
    stats: &RecordStats,
    started: Instant,
    cancelled: &AtomicBool,
) {
    if let Some(full_text) = session.complete() {
        tracing::debug!(
            bytes = session.processed_offset(),
            lines = stats.lines,
            deltas = stats.deltas,
            dropped = stats.dropped,
            duration_ms = started.elapsed().as_millis() as u64,
            "stream completed"
        );
        if !cancelled.load(Ordering::SeqCst) {
            sink.on_done(full_text);
        }
    }
}
