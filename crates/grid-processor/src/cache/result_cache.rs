//! Bounded LRU memoization of expensive results.

use std::convert::Infallible;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use crate::types::CacheStats;

/// Thread-safe LRU cache that computes values on a miss.
///
/// Values are computed outside the lock, so two threads missing on the same
/// key may both compute. The first value stored wins: a later result for a
/// key already present is discarded and the stored value returned instead.
/// Failed computations are never stored.
///
/// Values are cloned out of the cache; wrap large values in `Arc`.
pub struct ResultCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> ResultCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up a value, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let found = self.entries.lock().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Check if a key exists without updating LRU order or statistics.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains(key)
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        match self.try_get_or_compute(key, || Ok::<V, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible
    /// computations. An error is returned to the caller and nothing is stored.
    pub fn try_get_or_compute<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.store(key, value))
    }

    fn store(&self, key: K, value: V) -> V {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        // The key is absent, so anything returned was evicted
        if entries.push(key, value.clone()).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all entries from the cache. Statistics are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
            capacity: self.capacity,
        }
    }
}

impl<K, V> std::fmt::Debug for ResultCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("capacity", &self.capacity)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hit_does_not_compute() {
        let cache = ResultCache::new(4);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };

        assert_eq!(cache.get_or_compute("a", compute), 42);
        assert_eq!(cache.get_or_compute("a", compute), 42);
        assert_eq!(calls.get(), 1);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResultCache::new(2);
        cache.get_or_compute(1, || "one");
        cache.get_or_compute(2, || "two");
        // Touch 1 so 2 becomes least recently used
        assert_eq!(cache.get(&1), Some("one"));
        cache.get_or_compute(3, || "three");

        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = ResultCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.get_or_compute(1, || 1);
        cache.get_or_compute(2, || 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&2));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache: ResultCache<&str, i32> = ResultCache::new(2);
        let err: Result<i32, String> = cache.try_get_or_compute("k", || Err("boom".into()));
        assert_eq!(err, Err("boom".to_string()));
        assert!(!cache.contains(&"k"));
        assert!(cache.is_empty());

        let ok: Result<i32, String> = cache.try_get_or_compute("k", || Ok(7));
        assert_eq!(ok, Ok(7));
        assert_eq!(cache.get(&"k"), Some(7));
    }

    #[test]
    fn test_first_stored_value_wins() {
        let cache = ResultCache::new(2);
        // The inner call stores a value while the outer computation runs
        let value = cache.get_or_compute(1, || {
            cache.get_or_compute(1, || "first");
            "second"
        });
        assert_eq!(value, "first");
        assert_eq!(cache.get(&1), Some("first"));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(2);
        cache.get_or_compute(1, || 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }
}
