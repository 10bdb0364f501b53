//! Storage Module
//!
//! Capability interfaces over the persistent key/value store and the cookie jar,
//! plus in-memory implementations of both.

mod cookie;
mod memory;

pub use cookie::{parse_cookie_header, Cookie, CookieExpiry, CookieJar, MemoryCookieJar};
pub use memory::MemoryStorage;

use crate::error::Result;

// == Storage Adapter ==
/// Thin capability over a persistent key/value store.
///
/// Writes that hit the store's capacity must fail with
/// [`CacheError::QuotaExceeded`](crate::error::CacheError::QuotaExceeded) so
/// callers can tell them apart from other failures. Implementations never retry.
pub trait StorageAdapter {
    /// Returns the value stored under `key`, or `CacheError::Missing`.
    fn get(&self, key: &str) -> Result<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str);

    /// Removes every key in the namespace.
    fn clear(&mut self);
}
