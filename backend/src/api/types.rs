//! REST API types.
//!
//! The upload endpoint returns the clean table both as typed order records
//! and as its column list, so a client can render it without re-deriving
//! anything.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::OrderRecord;
use crate::transform::pipeline::PipelineResult;
use crate::transform::TimeFormat;

/// Response sent after an export is uploaded and cleaned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "warning" (a time column fell back to 24-hour)
    pub status: String,

    /// Output column names, in order
    pub columns: Vec<String>,

    /// One record per surviving order, sorted
    pub orders: Vec<OrderRecord>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_orders: usize,
    pub body_rows: usize,
    pub excluded_rows: usize,
    pub time_formats: Vec<TimeColumnFormat>,
    pub csv_info: CsvMetadata,
}

/// Format chosen for one time column
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeColumnFormat {
    pub column: String,
    pub format: TimeFormat,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<PipelineResult> for UploadResponse {
    fn from(result: PipelineResult) -> Self {
        let orders = OrderRecord::from_table(&result.table);
        let columns = result
            .table
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let degraded = result
            .stats
            .time_formats
            .iter()
            .any(|(_, format)| *format == TimeFormat::TwentyFourHour);

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if degraded { "warning" } else { "ready" }.to_string(),
            columns,
            metadata: ResponseMetadata {
                total_orders: orders.len(),
                body_rows: result.stats.body_rows,
                excluded_rows: result.stats.excluded_rows,
                time_formats: result
                    .stats
                    .time_formats
                    .into_iter()
                    .map(|(column, format)| TimeColumnFormat { column, format })
                    .collect(),
                csv_info: CsvMetadata {
                    encoding: result.csv_info.encoding,
                    row_count: result.csv_info.raw_rows,
                    columns: result.csv_info.headers,
                },
            },
            orders,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "orders": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{columns, Cell, CleanTable};
    use crate::transform::pipeline::{CsvInfo, PipelineStats};

    fn result(time_formats: Vec<(String, TimeFormat)>) -> PipelineResult {
        let names: Vec<String> = columns::OUTPUT_COLUMNS.iter().map(|s| s.to_string()).collect();
        let mut row = vec![Cell::Null; names.len()];
        row[1] = Cell::Text("200".into());
        PipelineResult {
            table: CleanTable::from_rows(names.clone(), vec![row]),
            stats: PipelineStats {
                body_rows: 3,
                excluded_rows: 2,
                output_rows: 1,
                time_formats,
            },
            csv_info: CsvInfo {
                encoding: "utf-8".into(),
                banner: vec!["Report".into()],
                raw_rows: 12,
                headers: names,
            },
        }
    }

    #[test]
    fn test_upload_response_from_result() {
        let response = UploadResponse::from(result(vec![("Time".into(), TimeFormat::TwelveHour)]));
        assert_eq!(response.status, "ready");
        assert_eq!(response.columns.len(), 14);
        assert_eq!(response.metadata.total_orders, 1);
        assert_eq!(response.metadata.excluded_rows, 2);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["orders"][0]["mrn"], "200");
        assert_eq!(json["metadata"]["timeFormats"][0]["format"], "twelveHour");
        assert_eq!(json["metadata"]["csvInfo"]["rowCount"], 12);
    }

    #[test]
    fn test_fallback_marks_warning() {
        let response = UploadResponse::from(result(vec![("Time".into(), TimeFormat::TwentyFourHour)]));
        assert_eq!(response.status, "warning");
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response("Missing column: CrCl");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "Missing column: CrCl");
        assert!(value["orders"].as_array().unwrap().is_empty());
    }
}
