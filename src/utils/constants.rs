//! Constants Module - Single Source of Truth
//!
//! Default settings, provider endpoints and action-link templates.
//! No other module hardcodes a URL or threshold.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "TokenScan";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for provider requests
pub const USER_AGENT: &str = concat!("TokenScan/", env!("CARGO_PKG_VERSION"));

// ============================================
// SCAN DEFAULTS
// ============================================

/// Shortest trimmed text accepted as a token address
pub const DEFAULT_MIN_IDENTIFIER_LEN: usize = 32;

/// Market data provider timeout (seconds)
pub const DEFAULT_MARKET_TIMEOUT_SECS: u64 = 10;

/// Safety provider timeout (seconds). Shorter: safety data is advisory.
pub const DEFAULT_SAFETY_TIMEOUT_SECS: u64 = 5;

/// Score above this is HIGH RISK
pub const DEFAULT_HIGH_RISK_SCORE: f64 = 5000.0;

/// Score above this is MEDIUM RISK
pub const DEFAULT_MEDIUM_RISK_SCORE: f64 = 1000.0;

/// Ranking size for `/top` without an argument
pub const DEFAULT_TOP_N: usize = 10;

/// Largest ranking a caller may request
pub const MAX_TOP_N: usize = 50;

// ============================================
// PROVIDER ENDPOINTS
// ============================================

/// DexScreener: GET {base}/tokens/{address}
pub const DEFAULT_DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";

/// RugCheck: GET {base}/tokens/{mint}/report/summary
pub const DEFAULT_RUGCHECK_BASE_URL: &str = "https://api.rugcheck.xyz/v1";

// ============================================
// ACTION LINKS
// ============================================

pub const DEXSCREENER_CHART_URL: &str = "https://dexscreener.com/solana";
pub const JUPITER_SWAP_URL: &str = "https://jup.ag/swap/SOL-";
pub const RUGCHECK_AUDIT_URL: &str = "https://rugcheck.xyz/tokens";

/// Chart link for a token
pub fn dexscreener_chart_link(identifier: &str) -> String {
    format!("{}/{}", DEXSCREENER_CHART_URL, identifier)
}

/// Swap link for a token (SOL as input)
pub fn jupiter_swap_link(identifier: &str) -> String {
    format!("{}{}", JUPITER_SWAP_URL, identifier)
}

/// Full audit link for a token
pub fn rugcheck_audit_link(identifier: &str) -> String {
    format!("{}/{}", RUGCHECK_AUDIT_URL, identifier)
}
