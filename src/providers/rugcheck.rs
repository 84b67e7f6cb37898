//! RugCheck API client - safety score adapter
//!
//! API: https://api.rugcheck.xyz/v1/tokens/{mint}/report/summary
//!
//! Safety data is advisory. A failed lookup (network, timeout, non-200,
//! unparseable body, missing score) becomes `SafetyTier::Unknown` and is
//! never surfaced as an error.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{lenient_f64, SafetyScoreProvider};
use crate::models::{AppError, AppResult, Identifier, RiskThresholds, SafetyTier};

/// Summary report; only the score matters here
#[derive(Debug, Deserialize)]
pub struct RugcheckSummary {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
}

pub struct RugcheckClient {
    client: reqwest::Client,
    base_url: String,
    thresholds: RiskThresholds,
}

impl RugcheckClient {
    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        thresholds: RiskThresholds,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            thresholds,
        }
    }

    /// Raw score for a mint
    pub async fn get_score(&self, mint: &str, timeout: Duration) -> AppResult<f64> {
        let url = format!("{}/tokens/{}/report/summary", self.base_url, mint);

        let response = self.client.get(&url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::provider_error(format!("RugCheck API error: {}", status)));
        }

        let body = response.bytes().await?;
        let summary: RugcheckSummary = serde_json::from_slice(&body)?;

        summary
            .score
            .ok_or_else(|| AppError::invalid_response("RugCheck summary has no numeric score"))
    }
}

#[async_trait]
impl SafetyScoreProvider for RugcheckClient {
    fn name(&self) -> &'static str {
        "RugCheck"
    }

    async fn fetch_safety(&self, id: &Identifier, timeout: Duration) -> SafetyTier {
        match self.get_score(id.as_str(), timeout).await {
            Ok(score) => {
                let tier = SafetyTier::from_score(score, &self.thresholds);
                debug!(identifier = %id, score, tier = tier.as_str(), "RugCheck score");
                tier
            }
            Err(e) => {
                warn!(identifier = %id, code = e.code_str(), "RugCheck lookup failed, tier UNKNOWN: {}", e.message);
                SafetyTier::Unknown
            }
        }
    }
}
