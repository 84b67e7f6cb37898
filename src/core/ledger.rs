//! Popularity Ledger
//!
//! Process-lifetime scan counts per identifier, shared by every request
//! handler. Backed by DashMap so concurrent increments never lose updates;
//! each entry remembers when it was first recorded so equal counts rank in
//! first-recorded order.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::models::Identifier;

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    count: u64,
    /// Insertion sequence number, used as the tie-breaker
    first_seen: u64,
}

/// One row of the ranked view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub identifier: Identifier,
    pub count: u64,
}

#[derive(Default)]
pub struct PopularityLedger {
    entries: DashMap<Identifier, LedgerEntry>,
    next_seq: AtomicU64,
}

impl PopularityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `id`, creating it at 1. Returns the new count.
    pub fn record(&self, id: &Identifier) -> u64 {
        let mut entry = self.entries.entry(id.clone()).or_insert_with(|| LedgerEntry {
            count: 0,
            first_seen: self.next_seq.fetch_add(1, Ordering::Relaxed),
        });
        entry.count += 1;
        let count = entry.count;
        drop(entry);

        debug!(identifier = %id, count, "Ledger updated");
        count
    }

    /// Current count for `id` (0 if never recorded)
    pub fn count(&self, id: &Identifier) -> u64 {
        self.entries.get(id).map(|e| e.count).unwrap_or(0)
    }

    /// Distinct identifiers recorded so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `n` entries by count descending, ties in first-recorded order
    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        let mut rows: Vec<(Identifier, LedgerEntry)> = self
            .entries
            .iter()
            .map(|item| (item.key().clone(), *item.value()))
            .collect();

        rows.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        rows.truncate(n);

        rows.into_iter()
            .map(|(identifier, entry)| RankedEntry {
                identifier,
                count: entry.count,
            })
            .collect()
    }
}
