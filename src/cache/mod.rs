//! Cache Module
//!
//! Cache-consistency engine: cookie index, name deduplication, half eviction
//! with shelf recovery, and the controller that resolves batches.

mod controller;
mod entry;
mod eviction;
mod index;
mod registry;
mod stats;


// Re-export public types
pub use controller::StyleCache;
pub use entry::{CacheEntry, EntryState};
pub use eviction::EvictionStore;
pub use index::{CookieIndex, SerializedIndex};
pub use registry::NameRegistry;
pub use stats::ResolveStats;
