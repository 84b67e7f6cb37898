//! Scan Aggregator
//!
//! Fans one identifier out to the market and safety providers concurrently,
//! each under its own timeout, and merges whatever comes back into a Report.
//! Neither call can cancel or fail the other. No retries.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    AppError, Identifier, MarketLookup, MarketState, Report, SafetyTier, ScanConfig,
};
use crate::providers::{MarketDataProvider, SafetyScoreProvider};

pub struct ScanAggregator {
    market: Arc<dyn MarketDataProvider>,
    safety: Arc<dyn SafetyScoreProvider>,
    market_timeout: Duration,
    safety_timeout: Duration,
}

impl ScanAggregator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        safety: Arc<dyn SafetyScoreProvider>,
        market_timeout: Duration,
        safety_timeout: Duration,
    ) -> Self {
        Self {
            market,
            safety,
            market_timeout,
            safety_timeout,
        }
    }

    pub fn from_config(
        market: Arc<dyn MarketDataProvider>,
        safety: Arc<dyn SafetyScoreProvider>,
        config: &ScanConfig,
    ) -> Self {
        Self::new(market, safety, config.market_timeout, config.safety_timeout)
    }

    /// Build a Report for `id`. Never fails: provider problems are encoded in
    /// the Report itself.
    #[instrument(skip(self, id), fields(identifier = %id, scan_id = tracing::field::Empty))]
    pub async fn aggregate(&self, id: &Identifier) -> Report {
        let start = Instant::now();
        let scan_id = Uuid::new_v4();
        tracing::Span::current().record("scan_id", tracing::field::display(scan_id));

        let (market, safety) = tokio::join!(self.market_state(id), self.safety_tier(id));

        info!(
            %scan_id,
            status = market.status().as_str(),
            safety = safety.as_str(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Scan aggregated"
        );

        Report {
            scan_id,
            identifier: id.clone(),
            market,
            safety,
            generated_at: Utc::now(),
        }
    }

    async fn market_state(&self, id: &Identifier) -> MarketState {
        let call = self.market.fetch_market(id, self.market_timeout);
        match tokio::time::timeout(self.market_timeout, call).await {
            Ok(Ok(MarketLookup::Found(snapshot))) => MarketState::Found(snapshot),
            Ok(Ok(MarketLookup::NotFound)) => MarketState::NotFound,
            Ok(Err(e)) => MarketState::FetchFailed {
                code: e.code,
                reason: e.message,
            },
            Err(_) => {
                let e = AppError::provider_timeout(self.market.name(), self.market_timeout);
                warn!(code = e.code_str(), "{}", e.message);
                MarketState::FetchFailed {
                    code: e.code,
                    reason: e.message,
                }
            }
        }
    }

    async fn safety_tier(&self, id: &Identifier) -> SafetyTier {
        let call = self.safety.fetch_safety(id, self.safety_timeout);
        match tokio::time::timeout(self.safety_timeout, call).await {
            Ok(tier) => tier,
            Err(_) => {
                warn!(
                    provider = self.safety.name(),
                    timeout_ms = self.safety_timeout.as_millis() as u64,
                    "Safety lookup timed out, tier UNKNOWN"
                );
                SafetyTier::Unknown
            }
        }
    }
}
