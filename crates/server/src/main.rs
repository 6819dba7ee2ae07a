//! # agentkpi-server
//!
//! HTTP API for the daily agent KPI pipeline. Workbooks are uploaded as the
//! raw request body.

mod error;

use agentkpi_pipeline::{build_db, KpiTable, Statistics};
use agentkpi_sheet::CellValue;
use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, HeaderName};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use error::ApiError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Server configuration, from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "agentkpi-server", version, about = "HTTP API for agentkpi")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "AGENTKPI_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// Rows returned by /kpi/preview when the request does not say
    #[arg(long, env = "AGENTKPI_PREVIEW_ROWS", default_value_t = 20)]
    pub preview_rows: usize,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "AGENTKPI_MAX_UPLOAD_MB", default_value_t = 25)]
    pub max_upload_mb: usize,
}

struct AppState {
    preview_rows: usize,
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Deserialize)]
pub struct PreviewParams {
    rows: Option<usize>,
}

/// Summary statistics plus the first rows of the KPI table
#[derive(Serialize)]
pub struct PreviewResponse {
    pub statistics: Statistics,
    pub columns: Vec<String>,
    pub rows: Vec<IndexMap<String, CellValue>>,
}

/// Run the pipeline off the async runtime
async fn run_pipeline(body: Bytes) -> Result<(KpiTable, Statistics), ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    let result = tokio::task::spawn_blocking(move || build_db(&body))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(result?)
}

async fn preview_kpi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ApiError> {
    let (table, statistics) = run_pipeline(body).await?;
    let head = table.preview(params.rows.unwrap_or(state.preview_rows));

    Ok(Json(PreviewResponse {
        statistics,
        columns: table.columns().into_iter().map(str::to_string).collect(),
        rows: head.records(),
    }))
}

async fn export_kpi(body: Bytes) -> Result<Response, ApiError> {
    let (table, stats) = run_pipeline(body).await?;
    let workbook = tokio::task::spawn_blocking(move || table.to_xlsx_bytes())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let filename = format!(
        "daily_agent_db_{}.xlsx",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (
            HeaderName::from_static("x-agentkpi-total-records"),
            stats.total_records.to_string(),
        ),
        (
            HeaderName::from_static("x-agentkpi-unique-agents"),
            stats.unique_agents.to_string(),
        ),
        (
            HeaderName::from_static("x-agentkpi-date-range"),
            stats.date_range_label(),
        ),
    ];
    info!(records = stats.total_records, bytes = workbook.len(), "exported KPI workbook");
    Ok((headers, workbook).into_response())
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(config: &Config) -> Router {
    let state = Arc::new(AppState {
        preview_rows: config.preview_rows,
    });

    Router::new()
        .route("/health", get(health))
        .route("/kpi", post(export_kpi))
        .route("/kpi/preview", post(preview_kpi))
        .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::parse();
    let app = create_router(&config);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "agentkpi-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
