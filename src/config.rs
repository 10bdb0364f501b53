//! Configuration Module
//!
//! Handles loading the cache namespace and cookie budget from environment variables.

use std::env;

/// Default byte budget for the serialized index cookie.
pub const DEFAULT_COOKIE_LIMIT: usize = 4000;

/// Style cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum byte length of the index cookie value
    pub cookie_limit: usize,
    /// Name of the cookie holding the key index
    pub cookie_name: String,
    /// Prefix prepended to cache keys in persistent storage
    pub storage_prefix: String,
    /// Storage slot holding the serialized name registry
    pub registry_slot: String,
    /// Path scope of the index cookie
    pub cookie_path: String,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STYLE_CACHE_COOKIE_LIMIT` - Cookie byte budget (default: 4000, `0` means default)
    /// - `STYLE_CACHE_COOKIE_NAME` - Index cookie name (default: `csses`)
    /// - `STYLE_CACHE_STORAGE_PREFIX` - Storage key prefix (default: `css.`)
    /// - `STYLE_CACHE_REGISTRY_SLOT` - Registry storage slot (default: `csses`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cookie_limit: env::var("STYLE_CACHE_COOKIE_LIMIT")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.cookie_limit),
            cookie_name: non_empty_var("STYLE_CACHE_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            storage_prefix: non_empty_var("STYLE_CACHE_STORAGE_PREFIX")
                .unwrap_or(defaults.storage_prefix),
            registry_slot: non_empty_var("STYLE_CACHE_REGISTRY_SLOT")
                .unwrap_or(defaults.registry_slot),
            cookie_path: defaults.cookie_path,
        }
    }

    /// Returns the persistent storage key for a cache key.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.storage_prefix, key)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cookie_limit: DEFAULT_COOKIE_LIMIT,
            cookie_name: "csses".to_string(),
            storage_prefix: "css.".to_string(),
            registry_slot: "csses".to_string(),
            cookie_path: "/".to_string(),
        }
    }
}
