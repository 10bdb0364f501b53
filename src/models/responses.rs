//! Response DTOs for the style cache
//!
//! Defines what a resolved batch hands back to the rendering layer.

use serde::Serialize;

use crate::cache::{CacheEntry, EntryState, ResolveStats};

/// One resolved style, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStyle {
    pub key: String,
    pub name: String,
    /// Style text to render, empty when the restore failed
    pub source: String,
    pub state: EntryState,
}

impl ResolvedStyle {
    /// Wraps a resolved entry with its final state.
    pub fn new(entry: CacheEntry, state: EntryState) -> Self {
        Self {
            key: entry.key,
            name: entry.name,
            source: entry.source,
            state,
        }
    }
}

/// Result of resolving a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    /// Resolved styles in batch order
    pub entries: Vec<ResolvedStyle>,
    /// At least one expected style could not be restored locally
    pub has_restore_failed: bool,
    /// Finalized index cookie value
    pub cookie: String,
    pub stats: ResolveStats,
}

impl ResolveReport {
    /// True when the caller must reload to fetch styles from the network.
    pub fn needs_reload(&self) -> bool {
        self.has_restore_failed
    }

    /// Returns the sources in render order.
    pub fn sources(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.source.as_str()).collect()
    }
}
