//! Error types for the order cleaning pipeline.
//!
//! - [`CsvError`] - reading and writing CSV bytes
//! - [`PipelineError`] - structural failures that abort a conversion
//! - [`ServerError`] - HTTP shell errors
//!
//! Per-cell problems (unparseable dates or times) are never errors: the cell
//! becomes null and the row survives. Only structural problems surface here.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV data.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Failed to serialize the output table.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => CsvError::ParseError(format!("line {}: {}", pos.line(), err)),
            None => CsvError::ParseError(err.to_string()),
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Structural pipeline failures.
///
/// This is the error type returned by [`crate::transform::pipeline::process_bytes`].
/// Any of these aborts the whole conversion; no partial table is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Too few rows after the preamble to locate the header row.
    #[error("Malformed input: expected at least 3 rows after the preamble, found {remaining}")]
    MalformedInput { remaining: usize },

    /// A column required by filtering, sorting or projection is absent.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
