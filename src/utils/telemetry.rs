//! Telemetry Module
//!
//! In-process counters describing how scans end: accepted vs rejected,
//! market found / not found / failed, safety lookups that fell back to UNKNOWN.
//!
//! Counters only. No identifiers are kept here and nothing is written to disk.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{SafetyTier, ScanStatus};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TelemetryStats {
    /// Inbound texts seen by the request handler
    pub total_messages: u64,
    /// Texts rejected by the validator
    pub rejected: u64,
    /// Texts accepted and scanned
    pub accepted: u64,
    pub market_found: u64,
    pub market_not_found: u64,
    pub market_fetch_failed: u64,
    /// Scans that ended in the generic failure message
    pub internal_failures: u64,
    /// Safety lookups that collapsed to UNKNOWN
    pub safety_unknown: u64,
    /// Average scan latency (ms) over completed scans
    pub avg_latency_ms: f64,
    /// Session start (unix seconds)
    pub period_start: u64,
    /// Snapshot time (unix seconds)
    pub period_end: u64,
}

impl TelemetryStats {
    /// Multi-line summary for shutdown logs
    pub fn summary(&self) -> String {
        format!(
            "messages={} accepted={} rejected={} found={} not_found={} failed={} internal={} safety_unknown={} avg_latency={:.1}ms",
            self.total_messages,
            self.accepted,
            self.rejected,
            self.market_found,
            self.market_not_found,
            self.market_fetch_failed,
            self.internal_failures,
            self.safety_unknown,
            self.avg_latency_ms,
        )
    }
}

/// Lock-free scan counters shared by all request handlers
pub struct ScanTelemetry {
    total_messages: AtomicU64,
    rejected: AtomicU64,
    accepted: AtomicU64,
    market_found: AtomicU64,
    market_not_found: AtomicU64,
    market_fetch_failed: AtomicU64,
    internal_failures: AtomicU64,
    safety_unknown: AtomicU64,
    completed: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
}

impl ScanTelemetry {
    pub fn new() -> Self {
        Self {
            total_messages: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            market_found: AtomicU64::new(0),
            market_not_found: AtomicU64::new(0),
            market_fetch_failed: AtomicU64::new(0),
            internal_failures: AtomicU64::new(0),
            safety_unknown: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    /// Record a validation decision for one inbound text
    pub fn record_message(&self, accepted: bool) {
        self.total_messages.fetch_add(1, Ordering::Relaxed);
        if accepted {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record how an accepted scan ended
    pub fn record_scan(&self, status: ScanStatus, safety: Option<SafetyTier>, latency_ms: u64) {
        let counter = match status {
            ScanStatus::Found => &self.market_found,
            ScanStatus::NotFound => &self.market_not_found,
            ScanStatus::FetchFailed => &self.market_fetch_failed,
            ScanStatus::InternalError => &self.internal_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if safety == Some(SafetyTier::Unknown) {
            self.safety_unknown.fetch_add(1, Ordering::Relaxed);
        }

        self.completed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    /// Get current statistics
    pub fn snapshot(&self) -> TelemetryStats {
        let completed = self.completed.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if completed > 0 {
            total_latency as f64 / completed as f64
        } else {
            0.0
        };

        TelemetryStats {
            total_messages: self.total_messages.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            market_found: self.market_found.load(Ordering::Relaxed),
            market_not_found: self.market_not_found.load(Ordering::Relaxed),
            market_fetch_failed: self.market_fetch_failed.load(Ordering::Relaxed),
            internal_failures: self.internal_failures.load(Ordering::Relaxed),
            safety_unknown: self.safety_unknown.load(Ordering::Relaxed),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }
}

impl Default for ScanTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
