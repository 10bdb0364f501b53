//! Request DTOs for the style cache
//!
//! Defines the batch of styles delivered by the server.

use serde::Deserialize;

use crate::cache::CacheEntry;

/// A batch of styles to resolve, in render order.
///
/// Deserializes the options object the server inlines into the page:
/// `{"csses": [{"k": "...", "n": "...", "s": "..."}], "cookieLimit": 4000}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleBatch {
    /// Styles in the order they must be rendered
    #[serde(rename = "csses", default)]
    pub entries: Vec<CacheEntry>,
    /// Optional cookie byte budget for this batch
    #[serde(rename = "cookieLimit", default)]
    pub cookie_limit: Option<usize>,
}

impl StyleBatch {
    pub fn new(entries: Vec<CacheEntry>) -> Self {
        Self {
            entries,
            cookie_limit: None,
        }
    }

    /// Sets the per-batch cookie budget.
    pub fn with_cookie_limit(mut self, cookie_limit: usize) -> Self {
        self.cookie_limit = Some(cookie_limit);
        self
    }

    /// Returns the batch budget, falling back to `default` when unset or zero.
    pub fn effective_cookie_limit(&self, default: usize) -> usize {
        self.cookie_limit.filter(|limit| *limit > 0).unwrap_or(default)
    }
}
