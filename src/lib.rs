//! TokenScan Library
//!
//! Chat-triggered token lookup: a user pastes a token address and gets back
//! one report merging
//! - market data (price, 24h change, market cap, liquidity) from DexScreener
//! - a coarse safety tier derived from the RugCheck score
//!
//! plus a process-lifetime ranking of the most scanned tokens.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod transport;
pub mod utils;

use std::sync::Arc;

pub use crate::core::{
    formatter, Command, IdentifierValidator, PopularityLedger, RankedEntry, RequestHandler,
    ScanAggregator, ScanReply,
};
pub use models::{
    ActionLink, AppError, AppResult, ErrorCode, Identifier, MarketLookup, MarketSnapshot,
    MarketState, RenderedOutput, Report, RiskThresholds, SafetyTier, ScanConfig, ScanStatus,
};
pub use providers::{
    DexScreenerClient, MarketDataProvider, RugcheckClient, SafetyScoreProvider,
};
pub use transport::{ChatHandle, ChatTransport, ConsoleTransport, MessageRef};
pub use utils::telemetry::{ScanTelemetry, TelemetryStats};

/// Wire the production providers into a request handler
pub fn build_handler(config: ScanConfig) -> AppResult<RequestHandler> {
    let client = providers::build_http_client()?;
    let market = Arc::new(DexScreenerClient::with_base_url(
        client.clone(),
        config.dexscreener_base_url.clone(),
    ));
    let safety = Arc::new(RugcheckClient::with_base_url(
        client,
        config.rugcheck_base_url.clone(),
        config.risk_thresholds,
    ));

    let aggregator = ScanAggregator::from_config(market, safety, &config);
    Ok(RequestHandler::new(
        config,
        aggregator,
        Arc::new(PopularityLedger::new()),
        Arc::new(ScanTelemetry::new()),
    ))
}
