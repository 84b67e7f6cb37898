//! Request Handler
//!
//! Boundary between a transport and the scan pipeline:
//! validate -> record in ledger -> aggregate -> render.
//!
//! The ledger is written exactly once per accepted text, before any provider
//! call, so nothing downstream can skip or repeat the increment. Panics in
//! aggregation or rendering are caught here and turned into the generic
//! failure message.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::aggregator::ScanAggregator;
use super::formatter;
use super::ledger::{PopularityLedger, RankedEntry};
use super::validator::IdentifierValidator;
use crate::models::{AppResult, Identifier, RenderedOutput, SafetyTier, ScanConfig, ScanStatus};
use crate::transport::{ChatHandle, ChatTransport};
use crate::utils::telemetry::ScanTelemetry;

/// Result of one accepted scan
#[derive(Debug, Clone)]
pub struct ScanReply {
    pub identifier: Identifier,
    /// Id of the Report behind this reply; `None` when no Report was produced
    pub scan_id: Option<Uuid>,
    pub status: ScanStatus,
    /// `None` when the scan failed before a Report existed
    pub safety: Option<SafetyTier>,
    pub output: RenderedOutput,
}

/// Chat commands the handler understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Top(Option<usize>),
    Unknown(String),
}

impl Command {
    /// Parse `/name[@bot] [arg]`; `None` if `text` is not a command
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let name = name.split('@').next().unwrap_or_default().to_lowercase();

        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "top" => Command::Top(parts.next().and_then(|n| n.parse().ok())),
            _ => Command::Unknown(name),
        })
    }
}

pub struct RequestHandler {
    validator: IdentifierValidator,
    aggregator: ScanAggregator,
    ledger: Arc<PopularityLedger>,
    telemetry: Arc<ScanTelemetry>,
    config: ScanConfig,
}

impl RequestHandler {
    pub fn new(
        config: ScanConfig,
        aggregator: ScanAggregator,
        ledger: Arc<PopularityLedger>,
        telemetry: Arc<ScanTelemetry>,
    ) -> Self {
        Self {
            validator: IdentifierValidator::new(config.min_identifier_len),
            aggregator,
            ledger,
            telemetry,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PopularityLedger {
        &self.ledger
    }

    pub fn telemetry(&self) -> &ScanTelemetry {
        &self.telemetry
    }

    /// Validate `raw` and, if accepted, count it in the ledger
    pub fn accept(&self, raw: &str) -> AppResult<Identifier> {
        match self.validator.validate(raw) {
            Ok(id) => {
                self.telemetry.record_message(true);
                let count = self.ledger.record(&id);
                info!(identifier = %id, count, "🔍 Scan requested");
                Ok(id)
            }
            Err(e) => {
                self.telemetry.record_message(false);
                debug!(code = e.code_str(), "Input rejected: {}", e.message);
                Err(e)
            }
        }
    }

    /// Aggregate and render an already accepted identifier
    pub async fn run_scan(&self, id: &Identifier) -> ScanReply {
        let start = Instant::now();

        let guarded = AssertUnwindSafe(async {
            let report = self.aggregator.aggregate(id).await;
            let output = formatter::render(&report);
            (report.scan_id, report.market.status(), report.safety, output)
        })
        .catch_unwind()
        .await;

        let (scan_id, status, safety, output) = match guarded {
            Ok((scan_id, status, safety, output)) => (Some(scan_id), status, Some(safety), output),
            Err(panic) => {
                error!(
                    identifier = %id,
                    panic = %panic_message(panic.as_ref()),
                    "❌ Scan failed unexpectedly"
                );
                (None, ScanStatus::InternalError, None, formatter::render_failure())
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        self.telemetry.record_scan(status, safety, latency_ms);
        info!(identifier = %id, status = status.as_str(), latency_ms, "✅ Scan complete");

        ScanReply {
            identifier: id.clone(),
            scan_id,
            status,
            safety,
            output,
        }
    }

    /// Validate, record and scan in one call (HTTP transport path)
    pub async fn scan(&self, raw: &str) -> AppResult<ScanReply> {
        let id = self.accept(raw)?;
        Ok(self.run_scan(&id).await)
    }

    /// Ranked view, `n` clamped to the configured bounds
    pub fn top(&self, n: Option<usize>) -> Vec<RankedEntry> {
        self.ledger.top_n(self.config.top_n(n))
    }

    /// Handle one inbound chat message end to end
    pub async fn handle_message(
        &self,
        transport: &dyn ChatTransport,
        chat: &ChatHandle,
        text: &str,
    ) -> AppResult<()> {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(transport, chat, command).await;
        }

        let id = match self.accept(text) {
            Ok(id) => id,
            Err(_) if self.config.reply_to_rejects => {
                let hint = formatter::render_rejection(self.validator.min_len());
                transport.send_message(chat, &hint).await?;
                return Ok(());
            }
            Err(_) => return Ok(()),
        };

        let placeholder = transport
            .send_message(chat, &formatter::render_scanning(&id))
            .await?;

        let reply = self.run_scan(&id).await;

        if let Err(e) = transport.edit_message(&placeholder, &reply.output).await {
            warn!(identifier = %id, code = e.code_str(), "Failed to deliver report: {}", e.message);
            return Err(e);
        }
        Ok(())
    }

    async fn handle_command(
        &self,
        transport: &dyn ChatTransport,
        chat: &ChatHandle,
        command: Command,
    ) -> AppResult<()> {
        let output = match command {
            Command::Start | Command::Help => formatter::render_welcome(),
            Command::Top(n) => formatter::render_top(&self.top(n)),
            Command::Unknown(name) => {
                debug!(command = %name, "Ignoring unknown command");
                return Ok(());
            }
        };
        transport.send_message(chat, &output).await?;
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
