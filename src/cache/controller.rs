//! Cache Controller Module
//!
//! Resolves a batch of styles against the cookie index, the name registry,
//! persistent storage and the eviction shelf, then writes a bounded index cookie.

use tracing::{debug, error, info, warn};

use crate::cache::{
    CacheEntry, CookieIndex, EntryState, EvictionStore, NameRegistry, ResolveStats,
};
use crate::config::CacheConfig;
use crate::error::ErrorKind;
use crate::models::{ResolveReport, ResolvedStyle, StyleBatch};
use crate::storage::{Cookie, CookieExpiry, CookieJar, StorageAdapter};

// == Resolve Context ==
/// Per-batch state, rebuilt from the cookie and storage on every call.
#[derive(Debug)]
struct ResolveContext {
    index: CookieIndex,
    registry: NameRegistry,
    stats: ResolveStats,
    has_restore_failed: bool,
}

/// Characters that would split a key when the index cookie is read back.
const RESERVED_KEY_CHARS: [char; 3] = [',', ';', '='];

// == Style Cache ==
/// Write-through cache for server-delivered styles.
///
/// Owns the storage and cookie capabilities plus the eviction shelf, which
/// outlives individual batches so evicted styles can be recovered later in the
/// same process.
///
/// Shelved payloads leave memory only when reclaimed, written again, or
/// superseded by a newer key with the same name. A long-lived embedding that
/// evicts many styles it never asks for again keeps them on the shelf until the
/// `StyleCache` is dropped.
#[derive(Debug)]
pub struct StyleCache<S, C> {
    /// Persistent key/value store
    storage: S,
    /// Cookie capability holding the key index
    cookies: C,
    config: CacheConfig,
    /// Shelf of payloads evicted for space
    evictions: EvictionStore,
}

impl<S: StorageAdapter, C: CookieJar> StyleCache<S, C> {
    // == Constructor ==
    /// Creates a new StyleCache over the given capabilities.
    ///
    /// # Arguments
    /// * `storage` - Quota-bounded key/value store holding the payloads
    /// * `cookies` - Cookie jar holding the key index
    /// * `config` - Namespace and cookie budget settings
    pub fn new(storage: S, cookies: C, config: CacheConfig) -> Self {
        Self {
            storage,
            cookies,
            config,
            evictions: EvictionStore::new(),
        }
    }

    /// Creates a StyleCache configured from environment variables.
    pub fn from_env(storage: S, cookies: C) -> Self {
        Self::new(storage, cookies, CacheConfig::from_env())
    }

    // == Resolve ==
    /// Resolves `entries` in order using the configured cookie budget.
    ///
    /// Every entry reaches a terminal state; failures are logged and reflected
    /// in the report, never returned as errors.
    ///
    /// # Arguments
    /// * `entries` - Styles in render order; an empty source asks the cache to supply it
    pub fn resolve(&mut self, entries: Vec<CacheEntry>) -> ResolveReport {
        let cookie_limit = self.config.cookie_limit;
        self.resolve_with_limit(entries, cookie_limit)
    }

    /// Resolves a server batch, honouring its cookie budget override.
    ///
    /// # Arguments
    /// * `batch` - Entries plus an optional `cookieLimit` (0 or absent uses the configured limit)
    pub fn resolve_batch(&mut self, batch: StyleBatch) -> ResolveReport {
        let cookie_limit = batch.effective_cookie_limit(self.config.cookie_limit);
        self.resolve_with_limit(batch.entries, cookie_limit)
    }

    fn resolve_with_limit(&mut self, entries: Vec<CacheEntry>, cookie_limit: usize) -> ResolveReport {
        let mut ctx = self.open_context();
        let mut resolved = Vec::with_capacity(entries.len());

        for mut entry in entries {
            let state = if entry.has_source() {
                if self.add_cache(&mut ctx, &entry, true) {
                    EntryState::Stored
                } else {
                    EntryState::Dropped
                }
            } else {
                self.get_cache(&mut ctx, &mut entry)
            };

            debug!("Resolved style {} ({}) as {:?}", entry.key, entry.name, state);
            if !state.has_source() {
                ctx.has_restore_failed = true;
            }
            ctx.stats.record(state);
            resolved.push(ResolvedStyle::new(entry, state));
        }

        let cookie = self.finalize(&mut ctx, cookie_limit);
        if ctx.has_restore_failed {
            warn!("Some styles could not be restored locally, a reload is required");
        }

        ResolveReport {
            entries: resolved,
            has_restore_failed: ctx.has_restore_failed,
            cookie,
            stats: ctx.stats,
        }
    }

    fn open_context(&self) -> ResolveContext {
        let cookie = self.cookies.read(&self.config.cookie_name);
        ResolveContext {
            index: CookieIndex::parse(cookie.as_deref()),
            registry: NameRegistry::load(&self.storage, &self.config.registry_slot),
            stats: ResolveStats::new(),
            has_restore_failed: false,
        }
    }

    // == Add Cache ==
    /// Writes a fresh entry through to storage.
    ///
    /// On a full store, evicts half of the index and retries once. Returns
    /// false when the entry could not be persisted.
    fn add_cache(&mut self, ctx: &mut ResolveContext, entry: &CacheEntry, allow_retry: bool) -> bool {
        if entry.key.is_empty() || !entry.has_source() {
            debug!("Style without key or source is not cached");
            return false;
        }
        if entry.key.contains(RESERVED_KEY_CHARS) {
            debug!("Style key {:?} cannot be indexed in a cookie, not caching it", entry.key);
            return false;
        }

        let storage_key = self.config.storage_key(&entry.key);
        let payload = match entry.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                error!("Dropping style {} from cache: {}", entry.key, err);
                return false;
            }
        };

        match self.storage.set(&storage_key, &payload) {
            Ok(()) => {
                self.evictions.discard(&entry.key);
                self.register(ctx, &entry.key, &entry.name);
                true
            }
            Err(err) if allow_retry && err.kind() == ErrorKind::QuotaExceeded => {
                warn!("{}, evicting half of the index and retrying", err);
                let evicted = self.evictions.evict_half(
                    &mut ctx.index,
                    &mut ctx.registry,
                    &mut self.storage,
                    &self.config,
                );
                ctx.stats.record_evictions(evicted.len());
                self.add_cache(ctx, entry, false)
            }
            Err(err) => {
                error!("Dropping style {} from cache: {}", entry.key, err);
                false
            }
        }
    }

    // == Get Cache ==
    /// Supplies the source of an entry the server expects to be cached.
    fn get_cache(&mut self, ctx: &mut ResolveContext, entry: &mut CacheEntry) -> EntryState {
        let storage_key = self.config.storage_key(&entry.key);

        if let Some(payload) = self.evictions.reclaim(&entry.key) {
            match CacheEntry::from_payload(&storage_key, &payload) {
                Ok(shelved) => {
                    entry.source = shelved.source;
                    if entry.name.is_empty() {
                        entry.name = shelved.name;
                    }
                    info!("Recovered style {} from the eviction shelf", entry.key);
                    if !self.add_cache(ctx, entry, true) {
                        warn!("Recovered style {} could not be stored again", entry.key);
                    }
                    return EntryState::Recovered;
                }
                Err(err) => warn!("Discarding shelved style {}: {}", entry.key, err),
            }
        }

        let stored = self
            .storage
            .get(&storage_key)
            .and_then(|payload| CacheEntry::from_payload(&storage_key, &payload));

        match stored {
            Ok(stored) => {
                entry.source = stored.source;
                if entry.name.is_empty() {
                    entry.name = stored.name;
                }
                self.register(ctx, &entry.key, &entry.name);
                EntryState::Restored
            }
            Err(err) => {
                if err.is_read_failure() {
                    warn!("Failed to restore style {}: {}", entry.key, err);
                } else {
                    error!("Storage error restoring style {}: {}", entry.key, err);
                }
                ctx.index.remove(&entry.key);
                ctx.registry.unregister(&entry.key);
                self.storage.remove(&storage_key);
                EntryState::FailedRestore
            }
        }
    }

    /// Registers `key` under `name`, deletes the keys it supersedes and
    /// marks it most recently used.
    fn register(&mut self, ctx: &mut ResolveContext, key: &str, name: &str) {
        let superseded = ctx.registry.register_and_collapse(key, name);
        for stale in &superseded {
            ctx.index.remove(stale);
            self.storage.remove(&self.config.storage_key(stale));
        }
        ctx.stats.record_superseded(superseded.len());
        self.evictions.discard_named(name, key);
        ctx.index.touch(key);
    }

    // == Finalize ==
    /// Fits the index into the cookie budget, persists the registry and writes
    /// the cookie. Returns the cookie value actually in effect.
    ///
    /// A failed registry write clears the whole namespace and empties the
    /// cookie; a failed cookie write reports an empty cookie.
    fn finalize(&mut self, ctx: &mut ResolveContext, cookie_limit: usize) -> String {
        let serialized = ctx.index.serialize(cookie_limit);
        for key in &serialized.rejected {
            self.storage.remove(&self.config.storage_key(key));
            ctx.registry.unregister(key);
        }
        if !serialized.rejected.is_empty() {
            info!(
                "Dropped {} styles to keep the index cookie within {} bytes",
                serialized.rejected.len(),
                cookie_limit
            );
        }
        ctx.stats.record_budget_evictions(serialized.rejected.len());

        let mut value = serialized.value;
        if let Err(err) = ctx
            .registry
            .persist(&mut self.storage, &self.config.registry_slot)
        {
            error!("{}, clearing the style cache namespace", err);
            self.storage.clear();
            ctx.index = CookieIndex::new();
            ctx.registry = NameRegistry::new();
            value.clear();
        }

        let cookie = Cookie::new(
            &self.config.cookie_name,
            value.clone(),
            CookieExpiry::Never,
            &self.config.cookie_path,
        );
        if let Err(err) = self.cookies.write(cookie) {
            warn!("{}, reporting an empty index cookie", err);
            value.clear();
        }
        value
    }

    // == Accessors ==
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to storage, e.g. to simulate another tab clearing it.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the eviction shelf.
    pub fn evictions(&self) -> &EvictionStore {
        &self.evictions
    }
}
