//! DashMap-backed TTL cache for reference data that is expensive to refetch
//! but safe to serve slightly stale.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Lock-free cache for reference lookups keyed by catalog name.
pub struct ReferenceCache<V> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> ReferenceCache<V> {
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            store: Arc::new(DashMap::with_capacity(max_entries)),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// Get a value, returns None if expired or missing.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.store.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert or update a value.
    pub fn put(&self, key: String, value: V) {
        // Simple eviction: if over capacity, skip insert (periodic cleanup
        // handles expiry).
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            return;
        }
        self.store.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Get a value, computing and caching it on a miss.
    pub fn get_or_insert_with(&self, key: &str, load: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(key) {
            return value;
        }
        debug!(key, "reference cache miss, loading");
        let value = load();
        self.put(key.to_string(), value.clone());
        value
    }

    /// Remove expired entries. Call periodically.
    pub fn evict_expired(&self) -> usize {
        let before = self.store.len();
        self.store
            .retain(|_, entry| entry.inserted_at.elapsed() <= self.ttl);
        before - self.store.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let cache: ReferenceCache<Vec<String>> = ReferenceCache::new(60, 10);
        cache.put("labels".to_string(), vec!["a".to_string()]);
        assert_eq!(cache.get("labels"), Some(vec!["a".to_string()]));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_expiry() {
        let cache: ReferenceCache<u32> = ReferenceCache::new(0, 10);
        cache.put("k".to_string(), 1);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_get_or_insert_with_loads_once() {
        let cache: ReferenceCache<u32> = ReferenceCache::new(60, 10);
        let mut loads = 0;
        let v = cache.get_or_insert_with("k", || {
            loads += 1;
            42
        });
        assert_eq!(v, 42);
        let v = cache.get_or_insert_with("k", || {
            loads += 1;
            99
        });
        assert_eq!(v, 42);
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_capacity_skips_new_inserts() {
        let cache: ReferenceCache<u32> = ReferenceCache::new(60, 1);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.get("b"), None);
        // Updating an existing key is still allowed at capacity.
        cache.put("a".to_string(), 3);
        assert_eq!(cache.get("a"), Some(3));
    }

    #[test]
    fn test_evict_expired() {
        let cache: ReferenceCache<u32> = ReferenceCache::new(0, 10);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.evict_expired(), 2);
        assert!(cache.is_empty());
    }
}
