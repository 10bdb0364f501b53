//! Style Cache - A write-through cache for server-delivered styles
//!
//! Keeps style payloads in a quota-bounded key/value store and indexes them in
//! a single byte-bounded cookie, with name deduplication and half eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use cache::{CacheEntry, EntryState, StyleCache};
pub use config::CacheConfig;
pub use error::{CacheError, ErrorKind, Result};
pub use models::{ResolveReport, ResolvedStyle, StyleBatch};
pub use storage::{CookieJar, MemoryCookieJar, MemoryStorage, StorageAdapter};
