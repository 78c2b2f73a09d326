//! Pipe-delimited table scanning.
//!
//! Accepts both well-formed markdown tables (header, separator row, body)
//! and the separator-less tables AI answers frequently emit. Anything that
//! does not survive the rejection rules is handed back to the caller, which
//! re-classifies the buffered lines individually so no text is lost.

use crate::types::TableModel;

/// A line with 2+ pipe characters is a candidate table line. A single-pipe
/// line is never a table.
pub(crate) fn is_table_line(line: &str) -> bool {
    line.matches('|').count() >= 2
}

/// A separator row consists only of `-` and `:` once pipes and whitespace
/// are removed, e.g. `|---|:---:|`.
pub fn is_separator_row(line: &str) -> bool {
    let mut saw_dash = false;
    for c in line.chars() {
        match c {
            '|' => {}
            '-' | ':' => saw_dash = true,
            c if c.is_whitespace() => {}
            _ => return false,
        }
    }
    saw_dash
}

/// Parse a buffered run of candidate lines into a table model.
///
/// Returns `None` (rejected) when no data row remains or the header has
/// fewer than two columns.
pub fn parse(lines: &[&str]) -> Option<TableModel> {
    let separator = lines.iter().position(|l| is_separator_row(l));

    let (header_line, body): (Option<&str>, Vec<&str>) = match separator {
        Some(idx) => {
            // At most one logical header row: the last non-blank line above
            // the separator. Stray separator rows inside the body are skipped.
            let header = lines[..idx]
                .iter()
                .rev()
                .find(|l| !l.trim().is_empty())
                .copied();
            let body = lines[idx + 1..]
                .iter()
                .filter(|l| !l.trim().is_empty() && !is_separator_row(l))
                .copied()
                .collect();
            (header, body)
        }
        None => {
            // Lenient mode: no separator, first line is the header.
            let mut it = lines.iter().filter(|l| !l.trim().is_empty());
            let header = it.next().copied();
            (header, it.copied().collect())
        }
    };

    let headers = split_cells(header_line?);
    if headers.len() < 2 {
        return None;
    }

    let mut rows: Vec<Vec<String>> = body.iter().map(|l| split_cells(l)).collect();
    if rows.is_empty() {
        return None;
    }
    for row in &mut rows {
        row.resize(headers.len(), String::new());
    }

    Some(TableModel { headers, rows })
}

/// Split a row on `|`, dropping the empty boundary cells produced by a
/// leading/trailing pipe, and trimming each remaining cell.
fn split_cells(line: &str) -> Vec<String> {
    let mut parts: Vec<&str> = line.split('|').collect();
    if parts.first().is_some_and(|p| p.trim().is_empty()) {
        parts.remove(0);
    }
    if parts.last().is_some_and(|p| p.trim().is_empty()) {
        parts.pop();
    }
    parts.iter().map(|p| p.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_separator_body_round_trips() {
        let model = parse(&["| A | B |", "|---|---|", "| 1 | 2 |"]).unwrap();
        assert_eq!(model.headers, vec!["A", "B"]);
        assert_eq!(model.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn lenient_mode_without_separator() {
        let model = parse(&["| Name | Age |", "| Ada | 36 |", "| Alan | 41 |"]).unwrap();
        assert_eq!(model.headers, vec!["Name", "Age"]);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows[1], vec!["Alan", "41"]);
    }

    #[test]
    fn single_line_run_is_rejected() {
        assert!(parse(&["| x | y |"]).is_none());
    }

    #[test]
    fn narrow_header_is_rejected() {
        assert!(parse(&["| only |", "|---|", "| 1 |"]).is_none());
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated() {
        let model = parse(&["| A | B | C |", "|---|---|---|", "| 1 |", "| 1 | 2 | 3 | 4 |"]).unwrap();
        assert_eq!(model.rows[0], vec!["1", "", ""]);
        assert_eq!(model.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn alignment_colons_count_as_separator() {
        assert!(is_separator_row("|:---|---:|:--:|"));
        assert!(is_separator_row("| --- | --- |"));
        assert!(!is_separator_row("| a | b |"));
        assert!(!is_separator_row("|||"));
    }

    #[test]
    fn inner_empty_cells_survive() {
        let model = parse(&["| A | B |", "|---|---|", "| 1 |  |"]).unwrap();
        assert_eq!(model.rows[0], vec!["1", ""]);
    }
}
