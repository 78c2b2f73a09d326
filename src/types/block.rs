//! Classified content blocks emitted by the assembler.

use serde::{Deserialize, Serialize};

use super::table::TableModel;

/// One classified, typed segment of streamed text.
///
/// Blocks are immutable values recomputed on each classification pass and are
/// emitted in the order they appear in the accumulated buffer. The renderer
/// treats the block list as replaceable-in-full on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block_type")]
pub enum ContentBlock {
    /// Ordinary prose.
    #[serde(rename = "PlainText")]
    PlainText { text: String },

    /// Markdown-style or capitalized-colon heading, level 1-3.
    #[serde(rename = "Heading")]
    Heading { level: u8, text: String },

    /// Bullet or numbered list item.
    #[serde(rename = "ListItem")]
    ListItem {
        ordered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
        text: String,
    },

    /// Pipe-delimited table.
    #[serde(rename = "Table")]
    Table { table: TableModel },

    /// Inline math in canonical markup.
    #[serde(rename = "MathInline")]
    MathInline { markup: String },

    /// Display math in canonical markup.
    #[serde(rename = "MathDisplay")]
    MathDisplay { markup: String },

    /// CJK-script heading. Kept separate from [`ContentBlock::Heading`]
    /// because CJK text uses different heading/list glyphs and must not be
    /// matched by the Latin-oriented rules.
    #[serde(rename = "ChineseHeading")]
    ChineseHeading { text: String },

    /// CJK-script subheading or list marker.
    #[serde(rename = "ChineseSubheading")]
    ChineseSubheading { text: String },
}

impl ContentBlock {
    /// The raw text carried by this block, for renderers that only need a
    /// flat string (tables excluded — use the [`TableModel`] directly).
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentBlock::PlainText { text }
            | ContentBlock::Heading { text, .. }
            | ContentBlock::ListItem { text, .. }
            | ContentBlock::ChineseHeading { text }
            | ContentBlock::ChineseSubheading { text } => Some(text),
            ContentBlock::MathInline { markup } | ContentBlock::MathDisplay { markup } => {
                Some(markup)
            }
            ContentBlock::Table { .. } => None,
        }
    }
}

/// Script hint for the classifier.
///
/// `Auto` inspects each line for CJK characters; `Latin` disables the CJK
/// rules entirely; `Chinese` always tries them first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageHint {
    #[default]
    Auto,
    Latin,
    Chinese,
}
