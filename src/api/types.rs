//! API Request/Response Types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActionLink, AppError, Identifier, SafetyTier};
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
        }
    }
}

// ============================================
// Scan
// ============================================

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Raw user text, validated the same way as a chat message
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ScanData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<Uuid>,
    pub identifier: Identifier,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<SafetyTier>,
    pub text: String,
    pub links: Vec<ActionLink>,
}

// ============================================
// Popularity
// ============================================

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    /// Kept as text so a malformed count falls back to the default, as `/top` does in chat
    pub n: Option<String>,
}

impl TopQuery {
    pub fn requested(&self) -> Option<usize> {
        self.n.as_deref().and_then(|n| n.trim().parse().ok())
    }
}

#[derive(Debug, Serialize)]
pub struct TopRow {
    pub rank: usize,
    pub identifier: Identifier,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TopData {
    pub entries: Vec<TopRow>,
    pub text: String,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub telemetry: TelemetryStats,
    pub distinct_identifiers: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
