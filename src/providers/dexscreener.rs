//! DexScreener API Client - market data adapter
//!
//! API: https://api.dexscreener.com/latest/dex/tokens/{tokenAddress}
//! Free, no API key required.
//!
//! The response is a list of trading pairs in the provider's own order. The
//! adapter takes the FIRST pair and does not re-rank: which pair wins on ties
//! (liquidity, volume, age) is entirely DexScreener's decision.
//!
//! `pairs` absent, null or empty means the token has no pair (NotFound). Any
//! non-success status or a body that is not a JSON object is a provider error.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{lenient_f64, lenient_string, MarketDataProvider};
use crate::models::{AppError, AppResult, ErrorCode, Identifier, MarketLookup, MarketSnapshot};

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener. Every field is best-effort.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexPair {
    /// Pair page on dexscreener.com
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    pub base_token: Option<DexToken>,
    /// Price in USD, decimal string
    #[serde(deserialize_with = "lenient_string")]
    pub price_usd: Option<String>,
    pub liquidity: Option<DexLiquidity>,
    pub price_change: Option<DexPriceChange>,
    #[serde(deserialize_with = "lenient_f64")]
    pub fdv: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexToken {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexLiquidity {
    #[serde(deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexPriceChange {
    #[serde(deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

impl DexPair {
    /// Project the pair onto the fields a report shows.
    /// Market cap prefers fully diluted valuation, as the bot always has.
    pub fn to_snapshot(&self) -> MarketSnapshot {
        let base = self.base_token.as_ref();
        MarketSnapshot {
            display_name: base.and_then(|t| t.name.clone()).filter(|s| !s.is_empty()),
            symbol: base.and_then(|t| t.symbol.clone()).filter(|s| !s.is_empty()),
            price_usd: self
                .price_usd
                .as_ref()
                .map(|p| p.trim().to_string())
                .filter(|p| p.parse::<f64>().map_or(false, f64::is_finite)),
            market_cap_usd: self.fdv.or(self.market_cap),
            liquidity_usd: self.liquidity.as_ref().and_then(|l| l.usd),
            change_24h_percent: self.price_change.as_ref().and_then(|c| c.h24),
            pair_url: self.url.clone(),
        }
    }
}

/// DexScreener API client
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch all pairs for a token address, in provider order
    pub async fn get_token_pairs(
        &self,
        token_address: &str,
        timeout: Duration,
    ) -> AppResult<Vec<DexPair>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);

        debug!("🔍 DexScreener: Fetching pairs for {}", token_address);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::provider_timeout("DexScreener", timeout)
                } else {
                    AppError::with_source(
                        ErrorCode::ProviderError,
                        "DexScreener request failed",
                        e,
                    )
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::provider_error(format!(
                "DexScreener API error: {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AppError::provider_timeout("DexScreener", timeout)
            } else {
                AppError::from(e)
            }
        })?;

        let data: DexScreenerResponse = serde_json::from_slice(&body).map_err(|e| {
            AppError::with_source(
                ErrorCode::ProviderInvalidResponse,
                "Failed to parse DexScreener response",
                e,
            )
        })?;

        let pairs = data.pairs.unwrap_or_default();
        info!("📊 DexScreener: Found {} pairs for {}", pairs.len(), token_address);

        Ok(pairs)
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    fn name(&self) -> &'static str {
        "DexScreener"
    }

    async fn fetch_market(&self, id: &Identifier, timeout: Duration) -> AppResult<MarketLookup> {
        let pairs = match self.get_token_pairs(id.as_str(), timeout).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(identifier = %id, code = e.code_str(), "⚠️ DexScreener error: {}", e.message);
                return Err(e);
            }
        };

        Ok(match pairs.into_iter().next() {
            Some(first) => MarketLookup::Found(first.to_snapshot()),
            None => MarketLookup::NotFound,
        })
    }
}
