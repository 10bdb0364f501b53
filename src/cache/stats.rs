//! Resolve Statistics Module
//!
//! Counts what happened to the entries of one batch.

use serde::Serialize;

use crate::cache::EntryState;

// == Resolve Stats ==
/// Per-batch resolution counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveStats {
    /// Entries whose fresh source was persisted
    pub stored: u64,
    /// Entries whose fresh source could not be persisted
    pub dropped: u64,
    /// Entries read back from persistent storage
    pub restored: u64,
    /// Entries brought back from the eviction shelf
    pub recovered: u64,
    /// Entries that could not be resolved locally
    pub failed_restores: u64,
    /// Keys evicted by the half-eviction policy
    pub evictions: u64,
    /// Keys deleted because a newer key took their name
    pub superseded: u64,
    /// Keys dropped to keep the cookie within budget
    pub budget_evictions: u64,
}

impl ResolveStats {
    // == Constructor ==
    /// Creates a new ResolveStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the share of cache lookups that found their source locally.
    ///
    /// Returns 0.0 if the batch requested nothing from the cache.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.restored + self.recovered;
        let total = hits + self.failed_restores;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    // == Record Outcome ==
    /// Counts the terminal state of one entry.
    pub fn record(&mut self, state: EntryState) {
        match state {
            EntryState::Stored => self.stored += 1,
            EntryState::Dropped => self.dropped += 1,
            EntryState::Restored => self.restored += 1,
            EntryState::Recovered => self.recovered += 1,
            EntryState::FailedRestore => self.failed_restores += 1,
        }
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_superseded(&mut self, count: usize) {
        self.superseded += count as u64;
    }

    pub fn record_budget_evictions(&mut self, count: usize) {
        self.budget_evictions += count as u64;
    }
}
