//! Header recovery: drop the export preamble and promote the header row.
//!
//! ```text
//! raw rows   0..=5   preamble (dropped)
//!            6, 7    report sub-headings (dropped)
//!            8       column names
//!            9..     body, re-indexed from 0
//! ```

use crate::api::logs::log_warning;
use crate::error::PipelineError;
use crate::models::{Cell, CleanTable, RawTable};

/// Leading rows of every export that carry no data.
pub const PREAMBLE_ROWS: usize = 6;

/// Position of the header row once the preamble is gone.
pub const HEADER_OFFSET: usize = 2;

/// Turn positional rows into a named table.
///
/// Fails with [`PipelineError::MalformedInput`] when fewer than
/// `HEADER_OFFSET + 1` rows remain after the preamble.
pub fn recover_header(raw: RawTable) -> Result<CleanTable, PipelineError> {
    let remaining = raw.rows.len().saturating_sub(PREAMBLE_ROWS);
    if remaining <= HEADER_OFFSET {
        return Err(PipelineError::MalformedInput { remaining });
    }

    let mut rows = raw.rows.into_iter().skip(PREAMBLE_ROWS + HEADER_OFFSET);
    let header = rows.next().unwrap_or_default();
    let width = header.len();

    let mut truncated = 0usize;
    let body: Vec<Vec<Cell>> = rows
        .map(|row| {
            if row.len() > width {
                truncated += 1;
            }
            let mut cells: Vec<Cell> = row.iter().take(width).map(|s| Cell::from_raw(s)).collect();
            cells.resize(width, Cell::Null);
            cells
        })
        .collect();

    if truncated > 0 {
        log_warning(format!(
            "{} rows had more fields than the {} header columns; extra fields dropped",
            truncated, width
        ));
    }

    Ok(CleanTable::from_rows(header, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[Vec<&str>]) -> RawTable {
        RawTable::new(
            vec!["Report".into()],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn preamble() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Facility", "Main"],
            vec!["Printed", "2024-01-20"],
            vec!["User", "pharm1"],
            vec![""],
            vec!["Range", "Jan"],
            vec!["", ""],
            vec!["Orders"],
            vec!["Detail"],
        ]
    }

    #[test]
    fn test_header_row_promoted() {
        let mut rows = preamble();
        rows.push(vec!["mrn", "sComponentName_1"]);
        rows.push(vec!["001", "Carboplatin"]);
        rows.push(vec!["002", ""]);

        let table = recover_header(raw(&rows)).unwrap();
        assert_eq!(table.column_names(), vec!["mrn", "sComponentName_1"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "mrn"), Some(&Cell::Text("001".into())));
        assert_eq!(table.get(1, "sComponentName_1"), Some(&Cell::Null));
    }

    #[test]
    fn test_header_only_gives_empty_body() {
        let mut rows = preamble();
        rows.push(vec!["mrn"]);

        let table = recover_header(raw(&rows)).unwrap();
        assert_eq!(table.column_names(), vec!["mrn"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_short_and_long_rows_fit_header_width() {
        let mut rows = preamble();
        rows.push(vec!["a", "b", "c"]);
        rows.push(vec!["1"]);
        rows.push(vec!["1", "2", "3", "4"]);

        let table = recover_header(raw(&rows)).unwrap();
        assert_eq!(table.row(0), vec![&Cell::Text("1".into()), &Cell::Null, &Cell::Null]);
        assert_eq!(table.row(1).len(), 3);
    }

    #[test]
    fn test_too_few_rows_is_malformed() {
        let rows: Vec<Vec<&str>> = preamble().into_iter().take(PREAMBLE_ROWS + 2).collect();
        let err = recover_header(raw(&rows)).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { remaining: 2 }));

        let err = recover_header(raw(&[])).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { remaining: 0 }));
    }
}
