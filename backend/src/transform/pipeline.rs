//! High-level pipeline API for cleaning a pharmacy order export.
//!
//! Combines every stage: reading, header recovery, filtering, splitting,
//! date and time parsing, derived fields, sorting and projection.
//!
//! # Example
//!
//! ```rust,ignore
//! use orderclean::pipeline::{process_file, PipelineOptions};
//! use std::path::Path;
//!
//! let result = process_file(Path::new("orders.csv"), &PipelineOptions::default())?;
//! println!("{} orders kept", result.table.row_count());
//! ```

use serde::Serialize;
use std::path::Path;

use super::derive::{derive_order_timestamp, derive_weeks_since_last_dose, parse_date_cells, DATE_COLUMNS};
use super::filter::{filter_excluded, ExclusionList};
use super::header::recover_header;
use super::project::sort_and_project;
use super::split::split_date_times;
use super::time::{parse_time_cells, TimeFormat};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineError;
use crate::models::{columns, CleanTable, RawTable};
use crate::parser::{read_raw_bytes, read_raw_file, ReadResult};

/// Time columns parsed after splitting, each with its own format fallback.
pub const TIME_COLUMNS: [&str; 3] = [
    columns::ORDER_TIME,
    columns::LAST_DOSE_TIME,
    columns::NEXT_DOSE_TIME,
];

/// Options for the cleaning pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Component names to drop
    pub exclusions: ExclusionList,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Sorted, projected output table
    pub table: CleanTable,

    /// Counters and per-column decisions
    pub stats: PipelineStats,

    /// CSV reading metadata
    pub csv_info: CsvInfo,
}

/// What happened along the way.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    /// Body rows after header recovery
    pub body_rows: usize,

    /// Rows dropped by the exclusion list
    pub excluded_rows: usize,

    /// Rows in the output
    pub output_rows: usize,

    /// Format chosen for each time column present
    pub time_formats: Vec<(String, TimeFormat)>,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub banner: Vec<String>,
    pub raw_rows: usize,
    pub headers: Vec<String>,
}

/// Clean an export from disk.
pub fn process_file(path: &Path, options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    log_info(format!("Reading {}", path.display()));
    let read = read_raw_file(path)?;
    process_read(read, options)
}

/// Clean export bytes.
pub fn process_bytes(bytes: &[u8], options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    let read = read_raw_bytes(bytes)?;
    process_read(read, options)
}

fn process_read(read: ReadResult, options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    log_success(format!("Detected encoding: {}", read.encoding));
    log_success(format!("Read {} rows", read.table.len()));
    process_raw(read.table, read.encoding, options)
}

/// Clean an already-read raw table.
pub fn process_raw(
    raw: RawTable,
    encoding: String,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError> {
    let banner = raw.banner.clone();
    let raw_rows = raw.len();

    // Step 1: Header recovery
    let mut table = recover_header(raw)?;
    let headers: Vec<String> = table.column_names().into_iter().map(String::from).collect();
    log_info(format!("Header has {} columns, {} body rows", headers.len(), table.row_count()));

    let mut stats = PipelineStats {
        body_rows: table.row_count(),
        ..Default::default()
    };

    // Step 2: Drop noise components
    stats.excluded_rows = filter_excluded(&mut table, &options.exclusions)?;
    log_success(format!(
        "Excluded {} rows ({} component names on list)",
        stats.excluded_rows,
        options.exclusions.len()
    ));

    // Step 3: Split combined date-time fields
    split_date_times(&mut table);

    // Step 4: Dates, then times
    for name in DATE_COLUMNS {
        if !parse_date_cells(&mut table, name) {
            log_warning(format!("Date column '{}' not present", name));
        }
    }

    for name in TIME_COLUMNS {
        if let Some(format) = parse_time_cells(&mut table, name) {
            if format == TimeFormat::TwentyFourHour {
                log_warning(format!("'{}' parsed as 24-hour ({})", name, format.pattern()));
            } else {
                log_info(format!("'{}' parsed as 12-hour ({})", name, format.pattern()));
            }
            stats.time_formats.push((name.to_string(), format));
        }
    }

    // Step 5: Derived fields
    derive_order_timestamp(&mut table);
    derive_weeks_since_last_dose(&mut table);

    // Step 6: Sort and project
    let table = sort_and_project(table)?;
    stats.output_rows = table.row_count();
    log_success(format!("{} orders in output", stats.output_rows));

    Ok(PipelineResult {
        table,
        stats,
        csv_info: CsvInfo {
            encoding,
            banner,
            raw_rows,
            headers,
        },
    })
}
