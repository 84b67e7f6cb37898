//! Configuration module for the scan pipeline
//!
//! Defaults live in `utils/constants.rs`; every value can be overridden by an
//! environment variable. Values that fail to parse are reported, never ignored.

use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use super::types::RiskThresholds;
use crate::utils::constants::{
    DEFAULT_DEXSCREENER_BASE_URL, DEFAULT_HIGH_RISK_SCORE, DEFAULT_MARKET_TIMEOUT_SECS,
    DEFAULT_MEDIUM_RISK_SCORE, DEFAULT_MIN_IDENTIFIER_LEN, DEFAULT_RUGCHECK_BASE_URL,
    DEFAULT_SAFETY_TIMEOUT_SECS, DEFAULT_TOP_N, MAX_TOP_N,
};

/// Configuration for the scan pipeline
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Minimum trimmed length for an identifier to be accepted
    pub min_identifier_len: usize,
    /// Timeout for the market data provider
    pub market_timeout: Duration,
    /// Timeout for the safety score provider
    pub safety_timeout: Duration,
    /// DexScreener API base (no trailing slash)
    pub dexscreener_base_url: String,
    /// RugCheck API base (no trailing slash)
    pub rugcheck_base_url: String,
    /// Score thresholds for the safety tiers
    pub risk_thresholds: RiskThresholds,
    /// Entries returned by `/top` without an explicit count
    pub default_top_n: usize,
    /// Upper clamp for `/top n`
    pub max_top_n: usize,
    /// Reply with a hint instead of silently dropping rejected input
    pub reply_to_rejects: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_identifier_len: DEFAULT_MIN_IDENTIFIER_LEN,
            market_timeout: Duration::from_secs(DEFAULT_MARKET_TIMEOUT_SECS),
            safety_timeout: Duration::from_secs(DEFAULT_SAFETY_TIMEOUT_SECS),
            dexscreener_base_url: DEFAULT_DEXSCREENER_BASE_URL.to_string(),
            rugcheck_base_url: DEFAULT_RUGCHECK_BASE_URL.to_string(),
            risk_thresholds: RiskThresholds {
                high: DEFAULT_HIGH_RISK_SCORE,
                medium: DEFAULT_MEDIUM_RISK_SCORE,
            },
            default_top_n: DEFAULT_TOP_N,
            max_top_n: MAX_TOP_N,
            reply_to_rejects: false,
        }
    }
}

impl ScanConfig {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var::<usize, _>(&lookup, "TOKENSCAN_MIN_ID_LEN")? {
            config.min_identifier_len = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "TOKENSCAN_MARKET_TIMEOUT_SECS")? {
            config.market_timeout = Duration::from_secs(v);
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "TOKENSCAN_SAFETY_TIMEOUT_SECS")? {
            config.safety_timeout = Duration::from_secs(v);
        }
        if let Some(url) = non_empty(&lookup, "DEXSCREENER_BASE_URL") {
            config.dexscreener_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = non_empty(&lookup, "RUGCHECK_BASE_URL") {
            config.rugcheck_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "TOKENSCAN_HIGH_RISK_SCORE")? {
            config.risk_thresholds.high = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "TOKENSCAN_MEDIUM_RISK_SCORE")? {
            config.risk_thresholds.medium = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "TOKENSCAN_TOP_N")? {
            config.default_top_n = v;
        }
        if let Some(v) = parse_var::<bool, _>(&lookup, "TOKENSCAN_REPLY_TO_REJECTS")? {
            config.reply_to_rejects = v;
        }

        config.validate()?;
        info!(
            min_identifier_len = config.min_identifier_len,
            market_timeout_ms = config.market_timeout.as_millis() as u64,
            safety_timeout_ms = config.safety_timeout.as_millis() as u64,
            "Scan configuration loaded"
        );
        Ok(config)
    }

    /// Reject combinations that would make the pipeline misbehave
    pub fn validate(&self) -> AppResult<()> {
        if self.min_identifier_len == 0 {
            return Err(AppError::invalid_config("min_identifier_len must be at least 1"));
        }
        if self.market_timeout.is_zero() || self.safety_timeout.is_zero() {
            return Err(AppError::invalid_config("provider timeouts must be non-zero"));
        }
        if !self.risk_thresholds.high.is_finite() || !self.risk_thresholds.medium.is_finite() {
            return Err(AppError::invalid_config("risk scores must be finite numbers"));
        }
        if self.risk_thresholds.medium >= self.risk_thresholds.high {
            return Err(AppError::invalid_config(format!(
                "medium risk score ({}) must be below high risk score ({})",
                self.risk_thresholds.medium, self.risk_thresholds.high
            )));
        }
        if self.default_top_n == 0 || self.default_top_n > self.max_top_n {
            return Err(AppError::invalid_config(format!(
                "default top-N must be within 1..={}",
                self.max_top_n
            )));
        }
        Ok(())
    }

    /// Clamp a requested ranking size, falling back to the default
    pub fn top_n(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_top_n)
            .clamp(1, self.max_top_n)
    }
}

/// Bind address for the HTTP transport
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Hosting platforms set PORT; TOKENSCAN_PORT is the local override
    pub fn from_env() -> AppResult<Self> {
        let host = std::env::var("TOKENSCAN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT").or_else(|_| std::env::var("TOKENSCAN_PORT")) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::invalid_config(format!("invalid port: {}", raw)))?,
            Err(_) => 8080,
        };
        Ok(Self { host, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::invalid_config(format!("{} has invalid value {:?}", key, raw))),
        None => Ok(None),
    }
}
