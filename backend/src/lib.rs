//! # Orderclean - pharmacy order export cleaning
//!
//! Orderclean turns the raw CSV export of a pharmacy order system (a report
//! preamble, sub-headings, then a table) into a sorted, 14-column order table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Export CSV │────▶│   Parser    │────▶│  Transform  │────▶│  Clean CSV  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (7 stages)  │     │  or JSON    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orderclean::{process_file, write_csv, PipelineOptions};
//! use std::path::Path;
//!
//! let result = process_file(Path::new("orders.csv"), &PipelineOptions::default())?;
//! std::fs::write("processed_orders.csv", write_csv(&result.table)?)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cells, tables and the output record
//! - [`parser`] - CSV reading with encoding detection, CSV writing
//! - [`transform`] - Cleaning stages and the pipeline
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{columns, Cell, CleanTable, OrderRecord, RawTable};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{decode_content, detect_encoding, read_raw_bytes, read_raw_file, write_csv, ReadResult};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use transform::{
    filter_excluded, recover_header, sort_and_project, split_date_times, ExclusionList, SplitPolicy,
    SplitRule, TimeFormat, DEFAULT_EXCLUSIONS,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    process_bytes, process_file, process_raw, CsvInfo, PipelineOptions, PipelineResult, PipelineStats,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CsvMetadata, ResponseMetadata, UploadResponse};

// Pipeline
pub mod pipeline {
    pub use crate::transform::pipeline::*;
}

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
