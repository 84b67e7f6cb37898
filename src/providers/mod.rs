//! Providers Module - External Data Sources
//!
//! Market data (DexScreener) and safety scores (RugCheck), each behind a trait
//! so the aggregator can be driven by any implementation.

pub mod dexscreener;
pub mod rugcheck;

pub use dexscreener::*;
pub use rugcheck::*;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::models::{AppError, AppResult, ErrorCode, Identifier, MarketLookup, SafetyTier};
use crate::utils::constants::USER_AGENT;

/// Source of market snapshots.
///
/// One call issues exactly one request. An empty pair list is
/// `Ok(MarketLookup::NotFound)`; transport, status and parse failures are `Err`.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_market(&self, id: &Identifier, timeout: Duration) -> AppResult<MarketLookup>;
}

/// Source of safety tiers.
///
/// Infallible by signature: every failure collapses to [`SafetyTier::Unknown`].
#[async_trait]
pub trait SafetyScoreProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_safety(&self, id: &Identifier, timeout: Duration) -> SafetyTier;
}

/// HTTP client shared by both adapters (one connection pool)
pub fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .map_err(|e| {
            AppError::with_source(ErrorCode::InternalUnexpected, "Failed to build HTTP client", e)
        })
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`
/// rather than failing the surrounding payload.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

/// Accepts a JSON string or number and keeps its textual form
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
