//! Eviction Store Module
//!
//! Overflow policy for a full storage backend: evict the least recently used
//! half of the index and keep their payloads on a transient shelf so they can
//! be brought back without a network round trip.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cache::{CookieIndex, NameRegistry};
use crate::config::CacheConfig;
use crate::storage::StorageAdapter;

/// A payload evicted for space, with the name its key held at eviction time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShelvedStyle {
    name: String,
    payload: String,
}

// == Eviction Store ==
/// Holds payloads evicted from persistent storage for the lifetime of the process.
///
/// A key on the shelf is never present in persistent storage at the same time.
#[derive(Debug, Default)]
pub struct EvictionStore {
    /// Cache key -> shelved payload
    shelf: HashMap<String, ShelvedStyle>,
}

impl EvictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Evict Half ==
    /// Evicts the least recently used half of `index` from storage.
    ///
    /// Exactly `floor(len / 2)` trailing keys leave the index. Each one is
    /// shelved (when storage still held a value), unregistered and removed
    /// from storage. Returns the evicted keys.
    ///
    /// # Arguments
    /// * `index` - Cookie index to split; keeps its most recent half
    /// * `registry` - Name registry the evicted keys are removed from
    /// * `storage` - Backend the evicted payloads are read from and deleted in
    /// * `config` - Supplies the storage key prefix
    pub fn evict_half<S: StorageAdapter>(
        &mut self,
        index: &mut CookieIndex,
        registry: &mut NameRegistry,
        storage: &mut S,
        config: &CacheConfig,
    ) -> Vec<String> {
        let evicted = index.split_off_lru_half();

        for key in &evicted {
            let storage_key = config.storage_key(key);
            if let Ok(payload) = storage.get(&storage_key) {
                let name = registry.name_of(key).unwrap_or_default().to_string();
                self.shelf.insert(key.clone(), ShelvedStyle { name, payload });
            }
            registry.unregister(key);
            storage.remove(&storage_key);
            debug!("Evicted {} to shelf", key);
        }

        info!(
            "Evicted {} of {} indexed styles to free storage",
            evicted.len(),
            evicted.len() + index.len()
        );
        evicted
    }

    // == Reclaim ==
    /// Takes the shelved payload for `key`, if any. A payload is handed out once.
    pub fn reclaim(&mut self, key: &str) -> Option<String> {
        self.shelf.remove(key).map(|shelved| shelved.payload)
    }

    /// Drops the shelved copy of `key` after it was written afresh.
    pub fn discard(&mut self, key: &str) {
        self.shelf.remove(key);
    }

    /// Drops every shelved payload recorded under `name` except `keep`'s.
    ///
    /// Called when `keep` takes over `name`, so superseded versions do not
    /// linger on the shelf. Returns how many payloads were dropped.
    pub fn discard_named(&mut self, name: &str, keep: &str) -> usize {
        let before = self.shelf.len();
        self.shelf
            .retain(|key, shelved| key == keep || shelved.name != name);
        let dropped = before - self.shelf.len();
        if dropped > 0 {
            debug!("Discarded {} shelved styles superseded by {}", dropped, keep);
        }
        dropped
    }

    pub fn is_shelved(&self, key: &str) -> bool {
        self.shelf.contains_key(key)
    }

    pub fn shelf_len(&self) -> usize {
        self.shelf.len()
    }
}
