//! Thread-safe keyed store
//!
//! Every operation takes the single lock once, so callers never observe a
//! half-applied update. Values are cloned out; store `Arc`s for large data.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::hash::Hash;

pub struct ChunkStore<K, V> {
    map: RwLock<FxHashMap<K, V>>,
}

impl<K, V> Default for ChunkStore<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ChunkStore<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            map: RwLock::new(FxHashMap::default()),
        }
    }

    /// Explicit absence: `None` is never confused with a stored value
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.read().get(key).cloned()
    }

    /// Insert or overwrite, returning the previous value
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.map.write().insert(key, value)
    }

    /// Insert only if the key is vacant. Returns `false` (and drops `value`)
    /// when another writer got there first.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut map = self.map.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.map.write().remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.read().contains_key(key)
    }

    /// Mutate a value in place under the write lock
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.map.write().get_mut(key).map(f)
    }

    /// Snapshot of the keys at the time of the call
    pub fn keys(&self) -> Vec<K> {
        self.map.read().keys().copied().collect()
    }

    /// Snapshot clone of the values at the time of the call
    pub fn values(&self) -> Vec<V> {
        self.map.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_missing_key_is_explicitly_absent() {
        let store: ChunkStore<i32, i32> = ChunkStore::new();
        assert_eq!(store.get(&7), None);
        store.set(7, 0);
        assert_eq!(store.get(&7), Some(0));
    }

    #[test]
    fn test_update_missing_returns_none() {
        let store: ChunkStore<i32, i32> = ChunkStore::new();
        assert_eq!(store.update(&1, |v| *v += 1), None);
        store.set(1, 1);
        let updated = store.update(&1, |v| {
            *v += 1;
            *v
        });
        assert_eq!(updated, Some(2));
    }

    #[test]
    fn test_concurrent_insert_if_absent_has_one_winner() {
        let store: Arc<ChunkStore<u32, usize>> = Arc::new(ChunkStore::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.insert_if_absent(42, worker))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshots_are_detached() {
        let store: ChunkStore<i32, String> = ChunkStore::new();
        store.set(1, "a".to_string());
        let keys = store.keys();
        store.remove(&1);
        assert_eq!(keys, vec![1]);
        assert!(store.is_empty());
    }
}
