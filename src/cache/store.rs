use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{Mutex, PoisonError, RwLock},
};

use lru::LruCache;

/// Storage of cached values keyed by linear grid index.
///
/// Implementations use interior locking so that one store can be shared by
/// concurrent readers.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: usize) -> Option<f32>;

    fn set(&self, key: usize, value: f32);

    /// Returns the number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a short name for log output.
    fn kind(&self) -> &'static str;
}

/// An unbounded in-memory store. Entries are never evicted.
#[derive(Debug, Default)]
pub struct MapStore {
    map: RwLock<HashMap<usize, f32>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Guards of poisoned locks are recovered.
impl CacheStore for MapStore {
    fn get(&self, key: usize) -> Option<f32> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&key).copied()
    }

    fn set(&self, key: usize, value: f32) {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key, value);
    }

    fn len(&self) -> usize {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn kind(&self) -> &'static str {
        "map"
    }
}

/// A bounded in-memory store that evicts the least recently used entry.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use gribpoint::{CacheStore, LruStore};
///
/// let store = LruStore::new(NonZeroUsize::new(2).unwrap());
/// store.set(1, 1.);
/// store.set(2, 2.);
/// assert_eq!(store.get(1), Some(1.));
///
/// store.set(3, 3.);
/// assert_eq!(store.get(2), None);
/// assert_eq!(store.len(), 2);
/// ```
#[derive(Debug)]
pub struct LruStore {
    cache: Mutex<LruCache<usize, f32>>,
}

impl LruStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cap()
    }
}

impl CacheStore for LruStore {
    fn get(&self, key: usize) -> Option<f32> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(&key).copied()
    }

    fn set(&self, key: usize, value: f32) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key, value);
    }

    fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn kind(&self) -> &'static str {
        "lru"
    }
}
