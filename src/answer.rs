//! Per-conversation assembly of a progressively streamed answer.

use crate::classify;
use crate::types::{ContentBlock, LanguageHint};

/// Owns the accumulated text of one logical conversation turn and keeps its
/// classified block sequence current as deltas arrive.
///
/// This collapses the delta-append + reclassify loop that every streaming
/// surface (chat, article writer, humanizer) otherwise duplicates. One
/// `LiveAnswer` per logical conversation; a new request for the same
/// conversation should cancel the previous stream's handle and call
/// [`LiveAnswer::reset`] before pushing new deltas.
///
/// Conversation-level one-shot flags live here as explicit fields rather
/// than process-wide state.
#[derive(Debug, Default)]
pub struct LiveAnswer {
    text: String,
    hint: LanguageHint,
    blocks: Vec<ContentBlock>,
    summary_requested: bool,
}

impl LiveAnswer {
    pub fn new(hint: LanguageHint) -> Self {
        Self {
            hint,
            ..Self::default()
        }
    }

    /// Append a delta and re-classify the whole buffer. Returns the current
    /// block sequence; renderers should replace their view in full.
    pub fn push_delta(&mut self, delta: &str) -> &[ContentBlock] {
        self.text.push_str(delta);
        self.blocks = classify::assemble(&self.text, self.hint);
        &self.blocks
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn language_hint(&self) -> LanguageHint {
        self.hint
    }

    /// Discard all content for a superseding request. One-shot flags are
    /// conversation-scoped and survive the reset.
    pub fn reset(&mut self) {
        self.text.clear();
        self.blocks.clear();
    }

    /// One-shot guard for conversation-level side requests (e.g. asking the
    /// backend for a title/summary). Returns `true` the first time only.
    pub fn mark_summary_requested(&mut self) -> bool {
        !std::mem::replace(&mut self.summary_requested, true)
    }

    pub fn summary_requested(&self) -> bool {
        self.summary_requested
    }
}
