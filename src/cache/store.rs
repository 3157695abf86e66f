//! Cache storage implementations.
//!
//! Point: post-by-id memoization, LRU only.
//! Query: multi-post query memoization, LRU plus per-entry TTL.

use std::sync::RwLock;
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;

use crate::domain::entities::Post;

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};
use super::metric_names::{
    METRIC_POINT_EVICT_TOTAL, METRIC_POINT_HIT_TOTAL, METRIC_POINT_MISS_TOTAL,
    METRIC_QUERY_EVICT_TOTAL, METRIC_QUERY_EXPIRED_TOTAL, METRIC_QUERY_HIT_TOTAL,
    METRIC_QUERY_MISS_TOTAL,
};

const POINT: &str = "point";
const QUERY: &str = "query";

// ============================================================================
// Point Store
// ============================================================================

/// Post-by-id storage.
///
/// Values are `Option<Post>` so a confirmed "not found" is remembered just
/// like a found post. Entries never expire; they leave only through LRU
/// eviction.
pub struct PointStore {
    entries: RwLock<LruCache<String, Option<Post>>>,
}

impl PointStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.point_capacity_non_zero())),
        }
    }

    /// Outer `None` is a miss; `Some(None)` is a cached not-found.
    pub fn get(&self, id: &str) -> Option<Option<Post>> {
        let hit = rw_write(&self.entries, POINT, "get").get(id).cloned();
        match hit {
            Some(value) => {
                counter!(METRIC_POINT_HIT_TOTAL).increment(1);
                Some(value)
            }
            None => {
                counter!(METRIC_POINT_MISS_TOTAL).increment(1);
                None
            }
        }
    }

    /// Probe without touching hit/miss counters.
    pub(crate) fn peek(&self, id: &str) -> Option<Option<Post>> {
        rw_write(&self.entries, POINT, "peek").get(id).cloned()
    }

    /// Store a lookup outcome; returns the id evicted to make room, if any.
    pub fn put(&self, id: String, value: Option<Post>) -> Option<String> {
        let evicted = rw_write(&self.entries, POINT, "put")
            .push(id.clone(), value)
            .and_then(|(old_id, _)| (old_id != id).then_some(old_id));
        if evicted.is_some() {
            counter!(METRIC_POINT_EVICT_TOTAL).increment(1);
        }
        evicted
    }

    pub fn contains(&self, id: &str) -> bool {
        rw_read(&self.entries, POINT, "contains").contains(id)
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, POINT, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        rw_write(&self.entries, POINT, "clear").clear();
    }
}

// ============================================================================
// Query Store
// ============================================================================

#[derive(Clone)]
struct TimedEntry {
    stored_at: Instant,
    ttl: Duration,
    posts: Vec<Post>,
}

impl TimedEntry {
    /// Valid up to and including `stored_at + ttl`; expired strictly after.
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Query-result storage with per-entry lifetimes.
///
/// Expired entries are dropped lazily when read. Empty result lists are
/// ordinary values.
pub struct QueryStore {
    config: CacheConfig,
    entries: RwLock<LruCache<QueryKey, TimedEntry>>,
}

impl QueryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            config: config.clone(),
            entries: RwLock::new(LruCache::new(config.query_capacity_non_zero())),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<Vec<Post>> {
        let operation = key.operation();
        match self.lookup(key, "get") {
            Lookup::Hit(posts) => {
                counter!(METRIC_QUERY_HIT_TOTAL, "operation" => operation).increment(1);
                Some(posts)
            }
            Lookup::Expired => {
                counter!(METRIC_QUERY_EXPIRED_TOTAL, "operation" => operation).increment(1);
                counter!(METRIC_QUERY_MISS_TOTAL, "operation" => operation).increment(1);
                None
            }
            Lookup::Absent => {
                counter!(METRIC_QUERY_MISS_TOTAL, "operation" => operation).increment(1);
                None
            }
        }
    }

    /// Probe without touching hit/miss counters.
    pub(crate) fn peek(&self, key: &QueryKey) -> Option<Vec<Post>> {
        match self.lookup(key, "peek") {
            Lookup::Hit(posts) => Some(posts),
            Lookup::Expired | Lookup::Absent => None,
        }
    }

    fn lookup(&self, key: &QueryKey, op: &'static str) -> Lookup {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, QUERY, op);
        let state = entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.posts.clone()));
        match state {
            Some(Some(posts)) => Lookup::Hit(posts),
            Some(None) => {
                entries.pop(key);
                Lookup::Expired
            }
            None => Lookup::Absent,
        }
    }

    /// Store a query result stamped with the current time; returns the key
    /// evicted to make room, if any.
    pub fn put(&self, key: QueryKey, posts: Vec<Post>) -> Option<QueryKey> {
        let entry = TimedEntry {
            stored_at: Instant::now(),
            ttl: self.config.ttl_for(&key),
            posts,
        };
        let evicted = rw_write(&self.entries, QUERY, "put")
            .push(key.clone(), entry)
            .and_then(|(old_key, _)| (old_key != key).then_some(old_key));
        if let Some(evicted_key) = evicted.as_ref() {
            counter!(METRIC_QUERY_EVICT_TOTAL, "operation" => evicted_key.operation())
                .increment(1);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, QUERY, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        rw_write(&self.entries, QUERY, "clear").clear();
    }
}

enum Lookup {
    Hit(Vec<Post>),
    Expired,
    Absent,
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::domain::entities::Author;
    use crate::domain::types::ScanAttribute;

    fn sample_post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: "Test Post".to_string(),
            body: "body".to_string(),
            categories: vec!["general".to_string()],
            tags: Vec::new(),
            author: Author {
                name: "Tester".to_string(),
                email: "tester@example.com".to_string(),
            },
            thumbnail: String::new(),
            created_at: 1,
        }
    }

    #[test]
    fn point_store_remembers_not_found() {
        let store = PointStore::new(&CacheConfig::default());

        assert!(store.get("missing").is_none());
        store.put("missing".to_string(), None);

        assert_eq!(store.get("missing"), Some(None));
        assert!(store.contains("missing"));
    }

    #[test]
    fn point_store_lru_eviction() {
        let config = CacheConfig {
            point_capacity: 2,
            ..Default::default()
        };
        let store = PointStore::new(&config);

        store.put("p1".to_string(), Some(sample_post("p1")));
        store.put("p2".to_string(), Some(sample_post("p2")));

        // Touch p1 so p2 becomes least recently used.
        assert!(store.get("p1").is_some());

        let evicted = store.put("p3".to_string(), Some(sample_post("p3")));
        assert_eq!(evicted.as_deref(), Some("p2"));

        assert!(store.get("p1").is_some());
        assert!(store.get("p2").is_none());
        assert!(store.get("p3").is_some());
    }

    #[test]
    fn point_store_overwrite_is_not_an_eviction() {
        let store = PointStore::new(&CacheConfig::default());
        store.put("p1".to_string(), None);
        assert!(store.put("p1".to_string(), Some(sample_post("p1"))).is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn query_store_expires_strictly_after_ttl() {
        let config = CacheConfig {
            scan_ttl_secs: 10,
            ..Default::default()
        };
        let store = QueryStore::new(&config);
        store.put(QueryKey::ScanAll, vec![sample_post("p1")]);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.get(&QueryKey::ScanAll).map(|p| p.len()), Some(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(store.get(&QueryKey::ScanAll).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn query_store_caches_empty_results() {
        let store = QueryStore::new(&CacheConfig::default());
        let key = QueryKey::scan_contains(ScanAttribute::Categories, "nothing");

        store.put(key.clone(), Vec::new());

        assert_eq!(store.get(&key), Some(Vec::new()));
    }

    #[test]
    fn query_store_lru_eviction() {
        let config = CacheConfig {
            query_capacity: 1,
            ..Default::default()
        };
        let store = QueryStore::new(&config);
        let tags = QueryKey::scan_contains(ScanAttribute::Tags, "rust");

        store.put(QueryKey::ScanAll, Vec::new());
        let evicted = store.put(tags.clone(), Vec::new());

        assert_eq!(evicted, Some(QueryKey::ScanAll));
        assert!(store.get(&QueryKey::ScanAll).is_none());
        assert!(store.get(&tags).is_some());
    }

    #[test]
    fn point_store_recovers_from_poisoned_lock() {
        let store = PointStore::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .entries
                .write()
                .expect("point lock should be acquired");
            panic!("poison point lock");
        }));

        store.put("p1".to_string(), Some(sample_post("p1")));
        assert!(store.get("p1").is_some());
    }
}
