//! 内容分类模块：把不断增长的回答文本重新切分为带类型的内容块。
//!
//! # Classification Module
//!
//! Re-segments the accumulated answer text into typed content blocks so the
//! UI can render structure progressively while the stream is still open.
//!
//! ## Overview
//!
//! The assembler walks the buffer line by line with a two-state machine
//! ({Scanning, InTable}): candidate table lines are buffered and handed to
//! the table scanner as one run; everything else goes through the single-line
//! decision table. A rejected table run degrades to individually classified
//! lines, never dropped content.
//!
//! Classification is a pure function of its inputs. It is re-run over the
//! full buffer on every delta, so calling it on `text` and then on
//! `text + suffix` reproduces identical blocks for the stable prefix.
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`line`] | Ordered single-line decision table |
//! | [`math`] | Canonical math transcription pipeline |
//! | [`table`] | Pipe-delimited table scanner |

pub mod line;
pub mod math;
pub mod table;

pub use line::classify_line;
pub use math::to_canonical;

use crate::types::{ContentBlock, LanguageHint};

/// Classify the full accumulated text into an ordered block sequence.
pub fn assemble(text: &str, hint: LanguageHint) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut table_run: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();

        if !table_run.is_empty() && !table::is_table_line(line) {
            flush_table_run(&mut table_run, &mut blocks, hint);
        }
        if table::is_table_line(line) {
            table_run.push(line);
            continue;
        }
        if line.is_empty() {
            continue;
        }
        blocks.push(line::classify_line(line, hint));
    }
    flush_table_run(&mut table_run, &mut blocks, hint);

    blocks
}

/// Hand a buffered run to the table scanner; on rejection every line is
/// re-emitted through the line classifier.
fn flush_table_run(run: &mut Vec<&str>, blocks: &mut Vec<ContentBlock>, hint: LanguageHint) {
    if run.is_empty() {
        return;
    }
    match table::parse(run) {
        Some(model) => blocks.push(ContentBlock::Table { table: model }),
        None => {
            for l in run.iter().filter(|l| !l.trim().is_empty()) {
                blocks.push(line::classify_line(l, hint));
            }
        }
    }
    run.clear();
}
