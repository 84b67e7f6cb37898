//! Type definitions for the scan pipeline
//! Identifier, provider results, the merged Report and its rendering

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::errors::ErrorCode;

/// Characters kept at each end of the abbreviated identifier
const SHORT_PREFIX_LEN: usize = 6;
const SHORT_SUFFIX_LEN: usize = 4;

/// A validated, trimmed token address.
///
/// Only the validator hands these out, so holding one means the text already
/// passed the length rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub(crate) fn from_trimmed(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: `AbCdEf...WxYz` for long identifiers, unchanged otherwise
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= SHORT_PREFIX_LEN + SHORT_SUFFIX_LEN + 2 {
            return self.0.clone();
        }
        let prefix: String = chars[..SHORT_PREFIX_LEN].iter().collect();
        let suffix: String = chars[chars.len() - SHORT_SUFFIX_LEN..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Market data for the first trading pair the provider returned.
/// Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub display_name: Option<String>,
    pub symbol: Option<String>,
    /// Decimal string exactly as the provider sent it
    pub price_usd: Option<String>,
    pub market_cap_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub change_24h_percent: Option<f64>,
    pub pair_url: Option<String>,
}

/// Successful market lookup: either a snapshot or a definite "no pair"
#[derive(Debug, Clone, PartialEq)]
pub enum MarketLookup {
    Found(MarketSnapshot),
    /// Provider answered but lists no trading pair (dead or unlisted token)
    NotFound,
}

/// Market half of a Report
#[derive(Debug, Clone, PartialEq)]
pub enum MarketState {
    Found(MarketSnapshot),
    NotFound,
    /// Provider error or timeout, distinct from NotFound
    FetchFailed { code: ErrorCode, reason: String },
}

impl MarketState {
    pub fn status(&self) -> ScanStatus {
        match self {
            MarketState::Found(_) => ScanStatus::Found,
            MarketState::NotFound => ScanStatus::NotFound,
            MarketState::FetchFailed { .. } => ScanStatus::FetchFailed,
        }
    }
}

/// Coarse risk classification derived from the safety provider's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyTier {
    Safe,
    MediumRisk,
    HighRisk,
    /// Safety provider failed, timed out or sent something unusable
    Unknown,
}

impl SafetyTier {
    /// Map a raw score to a tier. Both thresholds are strict: a score equal to
    /// a threshold stays in the lower tier.
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if !score.is_finite() {
            return SafetyTier::Unknown;
        }
        if score > thresholds.high {
            SafetyTier::HighRisk
        } else if score > thresholds.medium {
            SafetyTier::MediumRisk
        } else {
            SafetyTier::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyTier::Safe => "SAFE",
            SafetyTier::MediumRisk => "MEDIUM RISK",
            SafetyTier::HighRisk => "HIGH RISK",
            SafetyTier::Unknown => "UNKNOWN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SafetyTier::Safe => "✅",
            SafetyTier::MediumRisk => "⚠️",
            SafetyTier::HighRisk => "🚨",
            SafetyTier::Unknown => "❔",
        }
    }
}

/// Score thresholds for [`SafetyTier::from_score`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 5000.0,
            medium: 1000.0,
        }
    }
}

/// Merged result of one scan, prior to rendering
#[derive(Debug, Clone)]
pub struct Report {
    pub scan_id: Uuid,
    pub identifier: Identifier,
    pub market: MarketState,
    pub safety: SafetyTier,
    pub generated_at: DateTime<Utc>,
}

/// Outcome class of a handled scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Found,
    NotFound,
    FetchFailed,
    InternalError,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Found => "found",
            ScanStatus::NotFound => "not_found",
            ScanStatus::FetchFailed => "fetch_failed",
            ScanStatus::InternalError => "internal_error",
        }
    }
}

/// Named external link attached to a rendered report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLink {
    pub label: String,
    pub url: String,
}

/// Text plus optional action links, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedOutput {
    pub text: String,
    pub links: Vec<ActionLink>,
}

impl RenderedOutput {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            links: Vec::new(),
        }
    }
}
