//! Name Registry Module
//!
//! Maps cache keys to their logical names so that a new key for an existing
//! name can supersede the old one.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{CacheError, ErrorKind, Result};
use crate::storage::StorageAdapter;

// == Name Registry ==
/// Key → logical name mapping, persisted as one JSON object.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameRegistry {
    names: BTreeMap<String, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Load ==
    /// Loads the registry stored under `slot`.
    ///
    /// A missing, `null` or unparsable slot yields an empty registry.
    ///
    /// # Arguments
    /// * `storage` - Backend holding the registry
    /// * `slot` - Storage key of the serialized mapping
    pub fn load<S: StorageAdapter>(storage: &S, slot: &str) -> Self {
        let raw = match storage.get(slot) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != ErrorKind::Missing {
                    warn!("Name registry unreadable, starting empty: {}", err);
                }
                return Self::new();
            }
        };

        match serde_json::from_str::<Option<BTreeMap<String, String>>>(&raw) {
            Ok(names) => Self {
                names: names.unwrap_or_default(),
            },
            Err(err) => {
                warn!("Name registry corrupt, starting empty: {}", err);
                Self::new()
            }
        }
    }

    // == Register And Collapse ==
    /// Records `key` under `name` and returns every other key that held `name`.
    ///
    /// The returned keys are superseded: their mappings are already gone, and
    /// the caller is responsible for dropping them from the index and storage.
    ///
    /// # Arguments
    /// * `key` - The key taking over `name`
    /// * `name` - Logical name; the empty name collapses like any other
    pub fn register_and_collapse(&mut self, key: &str, name: &str) -> Vec<String> {
        let superseded: Vec<String> = self
            .names
            .iter()
            .filter(|(k, n)| n.as_str() == name && k.as_str() != key)
            .map(|(k, _)| k.clone())
            .collect();

        for stale in &superseded {
            debug!("Key {} superseded by {} for name {}", stale, key, name);
            self.names.remove(stale);
        }

        self.names.insert(key.to_string(), name.to_string());
        superseded
    }

    // == Unregister ==
    /// Deletes the mapping for `key`. Returns true if one existed.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.names.remove(key).is_some()
    }

    // == Persist ==
    /// Writes the full mapping to `slot`.
    pub fn persist<S: StorageAdapter>(&self, storage: &mut S, slot: &str) -> Result<()> {
        let raw = serde_json::to_string(&self.names)
            .map_err(|err| CacheError::RegistryPersist(err.to_string()))?;
        storage
            .set(slot, &raw)
            .map_err(|err| CacheError::RegistryPersist(err.to_string()))
    }

    // == Accessors ==
    /// Returns the name registered for `key`.
    pub fn name_of(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Returns all keys registered under `name`.
    pub fn keys_named(&self, name: &str) -> Vec<&str> {
        self.names
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
