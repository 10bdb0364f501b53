//! Cookie Index Module
//!
//! Ordered list of cache keys that is persisted as a single cookie value.

use std::collections::VecDeque;

/// Separator between keys in the cookie value.
const SEPARATOR: char = ',';

// == Cookie Index ==
/// Tracks recency of cached keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// The order is the persisted contract: it is written to the cookie as-is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CookieIndex {
    /// Order of keys by access time
    order: VecDeque<String>,
}

/// Result of fitting the index into a cookie budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedIndex {
    /// Cookie value, keys joined by `,`
    pub value: String,
    /// Keys that did not fit, most recent first
    pub rejected: Vec<String>,
}

impl CookieIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Parse ==
    /// Builds the index from the current cookie value.
    ///
    /// An absent cookie yields an empty index. Empty segments and repeated
    /// keys are skipped, keeping the first occurrence.
    pub fn parse(cookie: Option<&str>) -> Self {
        let mut index = Self::new();
        for key in cookie.unwrap_or_default().split(SEPARATOR) {
            if !key.is_empty() && !index.contains(key) {
                index.order.push_back(key.to_string());
            }
        }
        index
    }

    // == Touch ==
    /// Marks a key as most recently used (moves to front).
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Remove ==
    /// Removes a key without reinserting it.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Split Off LRU Half ==
    /// Removes and returns the `floor(len / 2)` least recently used keys.
    ///
    /// Returned keys keep index order (more recent first).
    pub fn split_off_lru_half(&mut self) -> Vec<String> {
        let evict = self.order.len() / 2;
        let keep = self.order.len() - evict;
        self.order.split_off(keep).into_iter().collect()
    }

    // == Serialize ==
    /// Joins keys into a cookie value no longer than `byte_limit` bytes.
    ///
    /// Keys are taken most recent first; each is accepted only if it still fits
    /// together with its separator, so a shorter key after a rejected one may
    /// still be kept. Rejected keys are removed from the index.
    pub fn serialize(&mut self, byte_limit: usize) -> SerializedIndex {
        let mut value = String::new();
        let mut kept = VecDeque::with_capacity(self.order.len());
        let mut rejected = Vec::new();

        for key in self.order.drain(..) {
            if key.is_empty() {
                continue;
            }
            let separator = if value.is_empty() { 0 } else { 1 };
            if value.len() + separator + key.len() <= byte_limit {
                if separator == 1 {
                    value.push(SEPARATOR);
                }
                value.push_str(&key);
                kept.push_back(key);
            } else {
                rejected.push(key);
            }
        }

        self.order = kept;
        SerializedIndex { value, rejected }
    }

    // == Accessors ==
    /// Returns the keys, most recent first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the most recently used key.
    pub fn front(&self) -> Option<&str> {
        self.order.front().map(String::as_str)
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(index: &CookieIndex) -> Vec<&str> {
        index.keys().collect()
    }

    #[test]
    fn test_index_parse_absent_cookie() {
        let index = CookieIndex::parse(None);
        assert!(index.is_empty());

        let index = CookieIndex::parse(Some(""));
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_parse_keeps_order() {
        let index = CookieIndex::parse(Some("c,b,a"));
        assert_eq!(keys(&index), vec!["c", "b", "a"]);
        assert_eq!(index.front(), Some("c"));
    }

    #[test]
    fn test_index_parse_skips_empty_and_duplicates() {
        let index = CookieIndex::parse(Some("a,,b,a,"));
        assert_eq!(keys(&index), vec!["a", "b"]);
    }

    #[test]
    fn test_index_touch_moves_to_front() {
        let mut index = CookieIndex::new();

        index.touch("a");
        index.touch("b");
        index.touch("c");
        index.touch("a");

        assert_eq!(keys(&index), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_index_touch_front_is_stable() {
        let mut index = CookieIndex::parse(Some("a,b"));

        index.touch("a");

        assert_eq!(keys(&index), vec!["a", "b"]);
    }

    #[test]
    fn test_index_remove() {
        let mut index = CookieIndex::parse(Some("a,b,c"));

        index.remove("b");
        index.remove("missing");

        assert_eq!(keys(&index), vec!["a", "c"]);
        assert!(!index.contains("b"));
    }

    #[test]
    fn test_index_split_off_lru_half() {
        let mut index = CookieIndex::parse(Some("a,b,c,d,e"));

        let evicted = index.split_off_lru_half();

        assert_eq!(evicted, vec!["d", "e"]);
        assert_eq!(keys(&index), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_index_split_off_small() {
        let mut index = CookieIndex::parse(Some("a"));
        assert!(index.split_off_lru_half().is_empty());
        assert_eq!(index.len(), 1);

        let mut index = CookieIndex::new();
        assert!(index.split_off_lru_half().is_empty());
    }

    #[test]
    fn test_index_serialize_within_budget() {
        let mut index = CookieIndex::parse(Some("a2,b1"));

        let serialized = index.serialize(4000);

        assert_eq!(serialized.value, "a2,b1");
        assert!(serialized.rejected.is_empty());
    }

    #[test]
    fn test_index_serialize_counts_separator() {
        let mut index = CookieIndex::parse(Some("aa,bb"));

        // "aa,bb" is 5 bytes; a limit of 4 only fits the first key
        let serialized = index.serialize(4);

        assert_eq!(serialized.value, "aa");
        assert_eq!(serialized.rejected, vec!["bb"]);
        assert_eq!(keys(&index), vec!["aa"]);
    }

    #[test]
    fn test_index_serialize_greedy_skips_long_key() {
        let mut index = CookieIndex::parse(Some("a,long-key,b"));

        let serialized = index.serialize(3);

        assert_eq!(serialized.value, "a,b");
        assert_eq!(serialized.rejected, vec!["long-key"]);
    }

    #[test]
    fn test_index_serialize_zero_budget() {
        let mut index = CookieIndex::parse(Some("a,b"));

        let serialized = index.serialize(0);

        assert_eq!(serialized.value, "");
        assert_eq!(serialized.rejected, vec!["a", "b"]);
        assert!(index.is_empty());
    }
}
