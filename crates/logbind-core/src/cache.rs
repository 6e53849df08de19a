//! Bounded recency cache
//!
//! Two generations of immutable maps published through an `ArcSwap`. Readers
//! take a snapshot without locking; writers serialise on a mutex and publish a
//! copy-on-write replacement.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

/// One cached value plus the generation it was last touched in
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    pub generation: u64,
}

#[derive(Debug)]
struct Generations<K, V> {
    current: Arc<HashMap<K, CacheEntry<K, V>>>,
    previous: Arc<HashMap<K, CacheEntry<K, V>>>,
    generation: u64,
}

impl<K, V> Generations<K, V> {
    fn empty() -> Self {
        Self {
            current: Arc::new(HashMap::new()),
            previous: Arc::new(HashMap::new()),
            generation: 0,
        }
    }
}

/// Fixed-capacity cache with approximate recency eviction
///
/// An item accessed within the last `capacity` insertions is retrievable; an
/// item untouched for more than `2 * capacity` insertions is gone.
///
/// # Example
///
/// ```
/// use logbind_core::cache::RecencyCache;
///
/// let cache = RecencyCache::new(2);
/// assert!(cache.insert("a", 1));
/// assert!(!cache.insert("a", 1));
/// assert_eq!(cache.get(&"a"), Some(1));
/// ```
pub struct RecencyCache<K, V> {
    state: ArcSwap<Generations<K, V>>,
    write_lock: Mutex<()>,
    capacity: usize,
}

impl<K, V> RecencyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Capacity is clamped to at least 1
    pub fn new(capacity: usize) -> Self {
        Self {
            state: ArcSwap::from_pointee(Generations::empty()),
            write_lock: Mutex::new(()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct keys currently retrievable
    pub fn len(&self) -> usize {
        let state = self.state.load();
        state.current.len()
            + state
                .previous
                .keys()
                .filter(|k| !state.current.contains_key(*k))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a key, promoting hits from the previous generation
    pub fn get(&self, key: &K) -> Option<V> {
        let state = self.state.load();
        if let Some(entry) = state.current.get(key) {
            return Some(entry.value.clone());
        }

        let value = state.previous.get(key)?.value.clone();
        drop(state);
        self.promote(key, &value);
        Some(value)
    }

    /// Insert or replace; returns true when the key was not present before
    pub fn insert(&self, key: K, value: V) -> bool {
        let _guard = self.write_lock.lock();
        let state = self.state.load_full();
        let is_new = !state.current.contains_key(&key) && !state.previous.contains_key(&key);
        self.publish(&state, key, value);
        is_new
    }

    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.state.store(Arc::new(Generations::empty()));
    }

    fn promote(&self, key: &K, value: &V) {
        let _guard = self.write_lock.lock();
        let state = self.state.load_full();
        if state.current.contains_key(key) {
            return;
        }
        // Evicted between the read and the lock
        if !state.previous.contains_key(key) {
            return;
        }
        self.publish(&state, key.clone(), value.clone());
    }

    /// Caller holds `write_lock`
    fn publish(&self, state: &Generations<K, V>, key: K, value: V) {
        let replacing = state.current.contains_key(&key);
        let next = if !replacing && state.current.len() >= self.capacity {
            let generation = state.generation + 1;
            let mut current = HashMap::with_capacity(self.capacity);
            current.insert(
                key.clone(),
                CacheEntry {
                    key,
                    value,
                    generation,
                },
            );
            Generations {
                current: Arc::new(current),
                previous: state.current.clone(),
                generation,
            }
        } else {
            let mut current = (*state.current).clone();
            current.insert(
                key.clone(),
                CacheEntry {
                    key,
                    value,
                    generation: state.generation,
                },
            );
            Generations {
                current: Arc::new(current),
                previous: state.previous.clone(),
                generation: state.generation,
            }
        };
        self.state.store(Arc::new(next));
    }
}

impl<K, V> std::fmt::Debug for RecencyCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.load();
        f.debug_struct("RecencyCache")
            .field("capacity", &self.capacity)
            .field("current", &state.current.len())
            .field("previous", &state.previous.len())
            .field("generation", &state.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_reports_new_keys() {
        let cache = RecencyCache::new(4);
        assert!(cache.insert(1, "one"));
        assert!(!cache.insert(1, "uno"));
        assert_eq!(cache.get(&1), Some("uno"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache: RecencyCache<u32, u32> = RecencyCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(1, 1);
        assert_eq!(cache.get(&1), Some(1));
    }

    #[test]
    fn test_rollover_keeps_previous_generation() {
        let cache = RecencyCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // current is full: "c" starts a new generation
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = RecencyCache::new(3);
        cache.insert("a", 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }
}
