//! Parsed table model.

use serde::{Deserialize, Serialize};

/// A parsed pipe-delimited table.
///
/// Rows are rectangular: every row is padded or truncated to the header's
/// column count by the scanner before the model is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    /// Header cells. Uniqueness is not required.
    pub headers: Vec<String>,
    /// Body rows, each with exactly `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
