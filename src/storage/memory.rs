//! In-memory storage adapter with an optional byte quota.

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::storage::StorageAdapter;

// == Memory Storage ==
/// HashMap-backed [`StorageAdapter`].
///
/// Usage is measured as the sum of `key.len() + value.len()` over all entries,
/// which is how browser key/value stores account their quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    /// Key-value storage
    entries: HashMap<String, String>,
    /// Maximum bytes allowed, None = unlimited
    quota_bytes: Option<usize>,
    /// Bytes currently in use
    used_bytes: usize,
}

impl MemoryStorage {
    // == Constructors ==
    /// Creates an unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once `quota_bytes` would be exceeded.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Returns true if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Returns all stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<String> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::Missing(key.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // An overwrite releases the bytes of the value it replaces
        let released = self
            .entries
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let projected = self.used_bytes - released + key.len() + value.len();

        if let Some(quota) = self.quota_bytes {
            if projected > quota {
                return Err(CacheError::QuotaExceeded(key.to_string()));
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.used_bytes = projected;
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.used_bytes -= key.len() + old.len();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.used_bytes = 0;
    }
}
