//! HTTP server for the order cleaning API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/upload`     | Upload an export, get JSON orders    |
//! | POST   | `/api/convert`    | Upload an export, get processed CSV  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::error::{ServerError, ServerResult};
use crate::parser::write_csv;
use crate::transform::pipeline::{process_bytes, PipelineOptions, PipelineResult};

/// File name suggested to clients downloading the processed CSV.
pub const OUTPUT_FILE_NAME: &str = "processed_orders.csv";

type ApiError = (StatusCode, Json<Value>);

/// Build the application router
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_export))
        .route("/api/convert", post(convert_export))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Orderclean server running on http://localhost:{}", port);
    println!("   POST /api/upload  - Upload export, JSON orders");
    println!("   POST /api/convert - Upload export, processed CSV");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "orderclean",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "convert": "POST /api/convert",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: cleaned orders as JSON
async fn upload_export(multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let result = read_and_process(multipart).await.map_err(reject)?;
    Ok(Json(UploadResponse::from(result)))
}

/// Convert endpoint: cleaned orders as a CSV attachment
async fn convert_export(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let result = read_and_process(multipart).await.map_err(reject)?;
    let bytes = write_csv(&result.table)
        .map_err(|e| reject(ServerError::Internal(e.to_string())))?;

    let disposition = format!("attachment; filename=\"{}\"", OUTPUT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

async fn read_and_process(mut multipart: Multipart) -> ServerResult<PipelineResult> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    log_info(format!(
        "New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    run_pipeline(bytes).await
}

/// Run the synchronous pipeline off the async executor.
async fn run_pipeline(bytes: Vec<u8>) -> ServerResult<PipelineResult> {
    let result = tokio::task::spawn_blocking(move || {
        process_bytes(&bytes, &PipelineOptions::default())
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(result?)
}

fn status_for(error: &ServerError) -> StatusCode {
    match error {
        ServerError::Pipeline(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: ServerError) -> ApiError {
    log_error(error.to_string());
    (status_for(&error), Json(error_response(&error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_client_errors_are_bad_request() {
        let missing = ServerError::Pipeline(PipelineError::MissingColumn("CrCl".into()));
        assert_eq!(status_for(&missing), StatusCode::BAD_REQUEST);

        let no_file = ServerError::BadRequest("No file provided".into());
        assert_eq!(status_for(&no_file), StatusCode::BAD_REQUEST);

        let join = ServerError::Internal("task panicked".into());
        assert_eq!(status_for(&join), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reject_body() {
        let (status, Json(body)) = reject(ServerError::Pipeline(PipelineError::MalformedInput {
            remaining: 1,
        }));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("Malformed input"));
    }

    #[tokio::test]
    async fn test_run_pipeline_reports_short_input() {
        let err = run_pipeline(b"Report\na\nb\n".to_vec()).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Pipeline(PipelineError::MalformedInput { .. })
        ));
    }
}
