//! Cache Entry Module
//!
//! Defines the style entry exchanged with the server and stored in persistent
//! storage, and the per-entry resolution outcome.

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A style payload version as delivered by the server.
///
/// Serialized with the short field names `k`, `n` and `s`, both on the wire
/// and in persistent storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Identifies one immutable payload version
    #[serde(rename = "k")]
    pub key: String,
    /// Logical slot the payload fills, e.g. `theme.css`
    #[serde(rename = "n", default)]
    pub name: String,
    /// Literal style text, empty when the server expects the cache to supply it
    #[serde(rename = "s", default)]
    pub source: String,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(key: impl Into<String>, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            source: source.into(),
        }
    }

    /// True when the server sent fresh content for this entry.
    pub fn has_source(&self) -> bool {
        !self.source.is_empty()
    }

    // == Payload Encoding ==
    /// Serializes the entry into its stored form.
    pub fn to_payload(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| CacheError::Corrupt {
            key: self.key.clone(),
            reason: err.to_string(),
        })
    }

    /// Parses a stored payload read from `storage_key`.
    ///
    /// `null` and payloads without a source are treated as corrupt, since they
    /// cannot supply the style text a restore needs.
    pub fn from_payload(storage_key: &str, payload: &str) -> Result<Self> {
        let corrupt = |reason: String| CacheError::Corrupt {
            key: storage_key.to_string(),
            reason,
        };

        let entry: Option<CacheEntry> =
            serde_json::from_str(payload).map_err(|err| corrupt(err.to_string()))?;
        match entry {
            Some(entry) if entry.has_source() => Ok(entry),
            Some(_) => Err(corrupt("payload has no source".to_string())),
            None => Err(corrupt("payload is null".to_string())),
        }
    }
}

// == Entry State ==
/// Outcome of resolving one entry within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Fresh source written to persistent storage
    Stored,
    /// Fresh source could not be persisted; it renders from the batch only
    Dropped,
    /// Source taken from the eviction shelf
    Recovered,
    /// Source read back from persistent storage
    Restored,
    /// Source could not be found locally, the caller must re-fetch
    FailedRestore,
}

impl EntryState {
    /// True for states that end with a source available for rendering.
    pub fn has_source(&self) -> bool {
        matches!(
            self,
            EntryState::Stored | EntryState::Dropped | EntryState::Recovered | EntryState::Restored
        )
    }
}
