//! Report Formatter
//!
//! Pure functions from values to chat text. No I/O, no failure paths: every
//! absent field renders as a fixed placeholder.

use crate::core::ledger::RankedEntry;
use crate::models::{ActionLink, Identifier, MarketSnapshot, MarketState, RenderedOutput, Report};
use crate::utils::constants::{dexscreener_chart_link, jupiter_swap_link, rugcheck_audit_link};

/// Shown for any absent numeric field
pub const PLACEHOLDER: &str = "N/A";
/// Shown for an absent token name
pub const UNKNOWN_NAME: &str = "Unknown";

/// Full report text plus links (links only when market data was found)
pub fn render(report: &Report) -> RenderedOutput {
    let short = report.identifier.short();

    match &report.market {
        MarketState::Found(snapshot) => RenderedOutput {
            text: render_snapshot(&short, snapshot, report),
            links: action_links(&report.identifier),
        },
        MarketState::NotFound => RenderedOutput::text_only(format!(
            "❌ No liquidity found for `{}`.\nThis token has no trading pair yet, or it is not a valid token address.",
            short
        )),
        MarketState::FetchFailed { .. } => RenderedOutput::text_only(format!(
            "⚠️ Market data is unavailable for `{}` right now.\nPlease try again in a moment.",
            short
        )),
    }
}

fn render_snapshot(short: &str, snapshot: &MarketSnapshot, report: &Report) -> String {
    let name = snapshot.display_name.as_deref().unwrap_or(UNKNOWN_NAME);
    let symbol = snapshot.symbol.as_deref().unwrap_or(PLACEHOLDER);
    let price = snapshot
        .price_usd
        .as_deref()
        .map(|p| format!("${}", p))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    format!(
        "🔎 {name} ({symbol})\n\
         📍 `{short}`\n\
         \n\
         🛡️ Safety: {tier_emoji} {tier}\n\
         💵 Price: {price}\n\
         📈 24h: {change}\n\
         🏦 Market Cap: {mcap}\n\
         💧 Liquidity: {liquidity}\n\
         \n\
         🕒 {generated}",
        name = name,
        symbol = symbol,
        short = short,
        tier_emoji = report.safety.emoji(),
        tier = report.safety.as_str(),
        price = price,
        change = snapshot
            .change_24h_percent
            .map(format_change)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        mcap = snapshot
            .market_cap_usd
            .map(format_usd)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        liquidity = snapshot
            .liquidity_usd
            .map(format_usd)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Chart, swap venue and full audit, each for this identifier
pub fn action_links(id: &Identifier) -> Vec<ActionLink> {
    vec![
        ActionLink {
            label: "📊 DexScreener".to_string(),
            url: dexscreener_chart_link(id.as_str()),
        },
        ActionLink {
            label: "🔄 Buy on Jupiter".to_string(),
            url: jupiter_swap_link(id.as_str()),
        },
        ActionLink {
            label: "🛡️ Full Audit".to_string(),
            url: rugcheck_audit_link(id.as_str()),
        },
    ]
}

/// Placeholder sent before the scan runs
pub fn render_scanning(id: &Identifier) -> RenderedOutput {
    RenderedOutput::text_only(format!("🔍 Scanning `{}`...", id.short()))
}

/// Generic failure for anything unanticipated
pub fn render_failure() -> RenderedOutput {
    RenderedOutput::text_only("❌ Analysis failed, please try again.")
}

/// Hint for rejected input (only when replies to rejects are enabled)
pub fn render_rejection(min_len: usize) -> RenderedOutput {
    RenderedOutput::text_only(format!(
        "🤔 That doesn't look like a token address. Paste a contract address ({}+ characters).",
        min_len
    ))
}

pub fn render_welcome() -> RenderedOutput {
    RenderedOutput::text_only(
        "👋 Welcome to TokenScan!\n\
         \n\
         Paste a token contract address and I'll fetch its price, liquidity, \
         market cap and a safety rating.\n\
         \n\
         /top - most scanned tokens",
    )
}

/// Ranked popularity view
pub fn render_top(entries: &[RankedEntry]) -> RenderedOutput {
    if entries.is_empty() {
        return RenderedOutput::text_only("📭 No tokens scanned yet.");
    }

    let mut text = String::from("🔥 Most scanned tokens:\n");
    for (i, entry) in entries.iter().enumerate() {
        let noun = if entry.count == 1 { "scan" } else { "scans" };
        text.push_str(&format!(
            "\n{}. `{}` - {} {}",
            i + 1,
            entry.identifier.short(),
            entry.count,
            noun
        ));
    }
    RenderedOutput::text_only(text)
}

/// `$1,234,567` for amounts of a dollar or more, cents below that
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs < 1.0 {
        return format!("{}${:.2}", sign, abs);
    }
    format!("{}${}", sign, group_thousands(&format!("{:.0}", abs)))
}

/// `+4.5%`, `-12.34%`, rounded to two decimals
pub fn format_change(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let mut rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:+}%", rounded)
}

/// Insert `,` every three digits of an unsigned integer string
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
