//! Raw and clean table containers.
//!
//! [`RawTable`] is what the CSV reader produces: positional text rows with no
//! header. [`CleanTable`] is column-oriented so that whole-column stages (time
//! parsing, splitting) work on contiguous values, while row stages (filter,
//! sort) apply one mask or permutation to every column.

use serde::Serialize;

use super::Cell;
use crate::error::PipelineError;

/// Positional rows as read from the export, before header recovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// First line of the export, consumed by the reader as its label row.
    pub banner: Vec<String>,
    /// Every following non-blank record.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(banner: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { banner, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

/// Column-oriented table with named columns.
///
/// Every column holds exactly `row_count` values. When a name appears more
/// than once, lookups resolve to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl CleanTable {
    /// An empty table with `row_count` rows and no columns yet.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Build from row-major cells. Every row must have `names.len()` cells.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let row_count = rows.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(row_count),
            })
            .collect();

        for row in rows {
            debug_assert_eq!(row.len(), columns.len());
            for (column, cell) in columns.iter_mut().zip(row) {
                column.values.push(cell);
            }
        }

        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.position(name).map(|i| self.columns[i].values.as_slice())
    }

    /// Like [`column`](Self::column) but a missing column is an error.
    pub fn require(&self, name: &str) -> Result<&[Cell], PipelineError> {
        self.column(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// Overwrite the named column in place, or append it when absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.row_count);
        match self.position(name) {
            Some(i) => self.columns[i].values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Cell>> {
        self.position(name).map(|i| self.columns.remove(i).values)
    }

    /// Keep the rows whose mask entry is true, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.row_count);
        for column in &mut self.columns {
            let mut mask = keep.iter();
            column.values.retain(|_| mask.next().copied().unwrap_or(false));
        }
        self.row_count = keep.iter().filter(|k| **k).count();
    }

    /// Rearrange rows so that new row `i` is old row `order[i]`.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.row_count);
        for column in &mut self.columns {
            let values = std::mem::take(&mut column.values);
            let mut slots: Vec<Option<Cell>> = values.into_iter().map(Some).collect();
            column.values = order
                .iter()
                .map(|&i| slots[i].take().unwrap_or(Cell::Null))
                .collect();
        }
    }

    /// A new table with exactly the named columns, in the given order.
    ///
    /// Fails on the first name that is not present.
    pub fn select(&self, names: &[&str]) -> Result<CleanTable, PipelineError> {
        let columns = names
            .iter()
            .map(|name| {
                self.require(name).map(|values| Column {
                    name: name.to_string(),
                    values: values.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CleanTable {
            columns,
            row_count: self.row_count,
        })
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.values[row]).collect()
    }
}
