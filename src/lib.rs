//! # streamblocks
//!
//! 流式回答的增量消费与结构化内容分类：一边接收一边把回答切分为带类型的内容块。
//!
//! Incremental streaming-response consumer and structured-content classifier
//! for long-form AI answers rendered while they arrive.
//!
//! ## Overview
//!
//! A streaming answer arrives as `data: `-framed records over a plain HTTP
//! response body. This library consumes that stream without ever reprocessing
//! bytes it has already seen, and re-segments the growing text into typed
//! content blocks (prose, headings, list items, tables, inline/display math)
//! so a renderer can show structure before the stream finishes. Ad-hoc
//! arithmetic and LaTeX-like notation is normalized into a single canonical
//! math markup.
//!
//! ## Core Guarantees
//!
//! - **At-most-once bytes**: the consumer re-reads the cumulative body and
//!   slices by offset, so duplicate snapshot deliveries cannot duplicate
//!   content.
//! - **Idempotent re-classification**: classifying `text` then
//!   `text + suffix` reproduces identical blocks for the stable prefix.
//! - **Idempotent transcription**: canonical math markup is a fixed point of
//!   the transcriber.
//! - **Nothing lost**: a rejected table run degrades to individually
//!   classified lines; malformed records are dropped without ever surfacing
//!   an error to the user.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamblocks::{FnSink, LanguageHint, LiveAnswer, StreamConsumer};
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn run() -> streamblocks::Result<()> {
//! let consumer = StreamConsumer::builder().api_key("sk-...").build()?;
//! let answer = Arc::new(Mutex::new(LiveAnswer::new(LanguageHint::Auto)));
//!
//! let view = answer.clone();
//! let handle = consumer.open(
//!     "https://api.example.com/v1/chat/completions",
//!     json!({"model": "gpt-4o-mini", "stream": true}),
//!     FnSink::new(
//!         move |delta| {
//!             let blocks = view.lock().unwrap().push_delta(delta).len();
//!             eprintln!("{blocks} blocks so far");
//!         },
//!         |full| println!("done: {} chars", full.len()),
//!         |err, partial| eprintln!("failed after {} chars: {err}", partial.len()),
//!     ),
//! );
//! // A superseding request for the same conversation cancels this one first.
//! handle.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`consumer`] | Stream consumer, session state, record framing |
//! | [`classify`] | Block assembler, line decision table, math transcription, table scanner |
//! | [`answer`] | Per-conversation accumulation + reclassification |
//! | [`types`] | Content blocks, table model, language hint |
//! | [`transport`] | Cumulative-body abstraction and reqwest implementation |

pub mod answer;
pub mod classify;
pub mod consumer;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use answer::LiveAnswer;
pub use consumer::{
    ConsumerBuilder, FnSink, SessionState, StreamConsumer, StreamHandle, StreamSession, StreamSink,
};
pub use types::{ContentBlock, LanguageHint, TableModel};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream alias used by the transport layer
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Error types for the library
pub mod error;
pub use error::{Error, StreamError};
