//! API Request Handlers

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::*;
use crate::core::handler::RequestHandler;
use crate::models::AppError;

/// Shared application state
pub struct AppState {
    pub handler: Arc<RequestHandler>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(err: &AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Scan
// ============================================

/// Same pipeline as a chat message; rejected text is a 400 instead of silence
pub async fn scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> ApiResult<ScanData> {
    let start = Instant::now();

    let reply = state
        .handler
        .scan(&req.text)
        .await
        .map_err(|e| error_response(&e, start))?;

    let data = ScanData {
        scan_id: reply.scan_id,
        identifier: reply.identifier,
        status: reply.status.as_str().to_string(),
        safety: reply.safety,
        text: reply.output.text,
        links: reply.output.links,
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Popularity
// ============================================

pub async fn top(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Json<ApiResponse<TopData>> {
    let start = Instant::now();

    let ranked = state.handler.top(query.requested());
    let text = crate::core::formatter::render_top(&ranked).text;
    let entries = ranked
        .into_iter()
        .enumerate()
        .map(|(i, entry)| TopRow {
            rank: i + 1,
            identifier: entry.identifier,
            count: entry.count,
        })
        .collect();

    Json(ApiResponse::success(
        TopData { entries, text },
        elapsed_ms(start),
    ))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let telemetry = state.handler.telemetry().snapshot();

    info!("📊 Stats: {}", telemetry.summary());

    let data = StatsData {
        telemetry,
        distinct_identifiers: state.handler.ledger().len(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
