//! Integration Tests for Batch Resolution
//!
//! Drives the public API across several page loads sharing one storage and
//! cookie jar.

use std::sync::Once;

use style_cache::{
    storage::{parse_cookie_header, CookieExpiry},
    CacheConfig, CacheEntry, EntryState, MemoryCookieJar, MemoryStorage, StorageAdapter,
    StyleBatch, StyleCache,
};

// == Helper Functions ==

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "style_cache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn create_test_cache() -> StyleCache<MemoryStorage, MemoryCookieJar> {
    init_tracing();
    StyleCache::new(
        MemoryStorage::new(),
        MemoryCookieJar::new(),
        CacheConfig::default(),
    )
}

// == Scenarios ==

#[test]
fn test_first_visit_stores_style() {
    let mut cache = create_test_cache();

    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "body{color:red}")]);

    assert_eq!(report.cookie, "a1");
    assert!(!report.has_restore_failed);
    assert_eq!(report.entries[0].source, "body{color:red}");
    assert!(cache.storage().contains("css.a1"));
}

#[test]
fn test_new_version_supersedes_old() {
    let mut cache = create_test_cache();
    cache.resolve(vec![CacheEntry::new("a1", "theme", "body{color:red}")]);

    let report = cache.resolve(vec![CacheEntry::new("a2", "theme", "body{color:blue}")]);

    assert_eq!(report.cookie, "a2");
    assert!(!cache.storage().contains("css.a1"));
    let registry = cache.storage().get("csses").unwrap();
    assert!(!registry.contains("a1"));
    assert!(registry.contains("a2"));
}

#[test]
fn test_superseded_version_cannot_be_restored() {
    let mut cache = create_test_cache();
    cache.resolve(vec![CacheEntry::new("a1", "theme", "body{color:red}")]);
    cache.resolve(vec![CacheEntry::new("a2", "theme", "body{color:blue}")]);

    // A stale page still references the old version
    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "")]);

    assert!(!cache.evictions().is_shelved("a1"));
    assert_eq!(report.entries[0].state, EntryState::FailedRestore);
    assert!(report.has_restore_failed);
    assert_eq!(report.cookie, "a2");
}

#[test]
fn test_unknown_key_requires_reload() {
    let mut cache = create_test_cache();

    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "")]);

    assert!(report.has_restore_failed);
    assert!(report.needs_reload());
    assert!(!report.cookie.split(',').any(|k| k == "a1"));
}

// == Multi-load Behaviour ==

#[test]
fn test_second_visit_restores_from_storage() {
    let mut cache = create_test_cache();
    cache.resolve(vec![
        CacheEntry::new("a1", "theme", "body{color:red}"),
        CacheEntry::new("g1", "grid", ".row{display:flex}"),
    ]);

    // Server saw both keys in the cookie and sent no sources
    let report = cache.resolve(vec![
        CacheEntry::new("a1", "theme", ""),
        CacheEntry::new("g1", "grid", ""),
    ]);

    assert!(!report.has_restore_failed);
    assert_eq!(
        report.sources(),
        vec!["body{color:red}", ".row{display:flex}"]
    );
    assert!(report
        .entries
        .iter()
        .all(|e| e.state == EntryState::Restored));
    assert_eq!(report.cookie, "g1,a1");
    assert_eq!(report.stats.hit_rate(), 1.0);
}

#[test]
fn test_idempotent_batch_keeps_cookie() {
    let mut cache = create_test_cache();
    let batch = vec![
        CacheEntry::new("a1", "theme", "body{}"),
        CacheEntry::new("b1", "layout", "main{}"),
    ];

    let first = cache.resolve(batch.clone());
    let second = cache.resolve(batch);

    assert_eq!(first.cookie, "b1,a1");
    assert_eq!(first.cookie, second.cookie);
    assert_eq!(first.sources(), second.sources());
}

#[test]
fn test_externally_cleared_storage_triggers_reload() {
    let mut cache = create_test_cache();
    cache.resolve(vec![CacheEntry::new("a1", "theme", "body{}")]);

    // Another tab wiped the namespace
    cache.storage_mut().clear();
    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "")]);

    assert!(report.has_restore_failed);
    assert_eq!(report.cookie, "");
    assert_eq!(report.entries[0].state, EntryState::FailedRestore);
}

#[test]
fn test_cookie_is_written_with_far_future_expiry() {
    let mut cache = create_test_cache();

    cache.resolve(vec![CacheEntry::new("a1", "theme", "body{}")]);

    let cookie = cache.cookies().get("csses").unwrap();
    assert_eq!(cookie.expiry, CookieExpiry::Never);
    assert_eq!(
        cookie.to_header_string(),
        "csses=a1;expires=Fri, 31 Dec 9999 23:59:59 GMT;path=/"
    );
}

#[test]
fn test_existing_cookie_header_seeds_index() {
    init_tracing();
    let mut storage = MemoryStorage::new();
    storage
        .set("css.b1", r#"{"k":"b1","n":"layout","s":"main{}"}"#)
        .unwrap();
    let jar = MemoryCookieJar::from_header("session=abc; csses=b1");
    let mut cache = StyleCache::new(storage, jar, CacheConfig::default());

    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "body{}")]);

    assert_eq!(report.cookie, "a1,b1");
    assert_eq!(
        parse_cookie_header(&cache.cookies().header(), "csses"),
        Some("a1,b1".to_string())
    );
}

#[test]
fn test_batch_json_with_cookie_limit() {
    let mut cache = create_test_cache();
    let json = r#"{
        "csses": [
            {"k": "first", "n": "a", "s": "a{}"},
            {"k": "second", "n": "b", "s": "b{}"}
        ],
        "cookieLimit": 6
    }"#;
    let batch: StyleBatch = serde_json::from_str(json).unwrap();

    let report = cache.resolve_batch(batch);

    assert_eq!(report.cookie, "second");
    assert!(!cache.storage().contains("css.first"));
    assert_eq!(report.entries[0].source, "a{}");
}

#[test]
fn test_quota_pressure_recovers_evicted_style() {
    init_tracing();
    // Each entry below takes 52 bytes; the registry needs up to 26
    let mut cache = StyleCache::new(
        MemoryStorage::with_quota(140),
        MemoryCookieJar::new(),
        CacheConfig::default(),
    );
    let fresh = |n: u8| CacheEntry::new(format!("k{}", n), format!("n{}", n), "x".repeat(20));

    let first = cache.resolve(vec![fresh(1), fresh(2), fresh(3)]);
    assert_eq!(first.cookie, "k3,k2");
    assert!(cache.evictions().is_shelved("k1"));

    let second = cache.resolve(vec![CacheEntry::new("k1", "n1", "")]);
    assert_eq!(second.entries[0].state, EntryState::Recovered);
    assert_eq!(second.entries[0].source, "x".repeat(20));
    assert!(!second.has_restore_failed);

    // The shelf copy is consumed; k1 now comes from storage
    let third = cache.resolve(vec![CacheEntry::new("k1", "n1", "")]);
    assert_eq!(third.entries[0].state, EntryState::Restored);
}

#[test]
fn test_report_serializes_for_glue_layer() {
    let mut cache = create_test_cache();

    let report = cache.resolve(vec![CacheEntry::new("a1", "theme", "body{}")]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["cookie"], "a1");
    assert_eq!(json["hasRestoreFailed"], false);
    assert_eq!(json["entries"][0]["state"], "stored");
    assert_eq!(json["stats"]["stored"], 1);
}
