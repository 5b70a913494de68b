//! Transformation module.
//!
//! This module turns a raw export into the clean order table:
//! - Header: preamble removal and header promotion
//! - Filter: exclusion list of noise components
//! - Split: combined date-time fields into date and time columns
//! - Time: time parsing with a column-wide format fallback
//! - Derive: date parsing, order timestamp, weeks since last dose
//! - Project: stable sort and output projection
//! - Pipeline: every stage in order

pub mod derive;
pub mod filter;
pub mod header;
pub mod pipeline;
pub mod project;
pub mod split;
pub mod time;

pub use filter::{filter_excluded, ExclusionList, DEFAULT_EXCLUSIONS};
pub use header::recover_header;
pub use pipeline::*;
pub use project::{project_output, sort_and_project, sort_orders};
pub use split::{split_date_times, SplitPolicy, SplitRule, SPLIT_RULES};
pub use time::{parse_time_column, ParsedTimes, TimeFormat};
