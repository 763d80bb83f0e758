//! A fixed-shard concurrent map for parallel accumulation.
//!
//! Keys are distributed over a fixed number of independently locked shards,
//! so writers touching different shards never contend. The map is used by
//! the parallel query path to accumulate per-document relevance.

use std::collections::BTreeMap;
use std::hash::Hash;

use ahash::AHashMap;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

/// Maps a key to the shard responsible for it.
pub trait ShardKey: Copy {
    /// Index of the shard for this key, in `0..shard_count`.
    fn shard_index(self, shard_count: usize) -> usize;
}

impl ShardKey for i32 {
    fn shard_index(self, shard_count: usize) -> usize {
        self.unsigned_abs() as usize % shard_count
    }
}

impl ShardKey for i64 {
    fn shard_index(self, shard_count: usize) -> usize {
        (self.unsigned_abs() % shard_count as u64) as usize
    }
}

impl ShardKey for u32 {
    fn shard_index(self, shard_count: usize) -> usize {
        self as usize % shard_count
    }
}

impl ShardKey for u64 {
    fn shard_index(self, shard_count: usize) -> usize {
        (self % shard_count as u64) as usize
    }
}

/// Scoped exclusive handle to one entry.
///
/// Holding the guard holds the entry's shard lock; dropping it releases the
/// shard. Guards for different shards may be held concurrently.
pub type ValueGuard<'a, V> = MappedMutexGuard<'a, V>;

/// A concurrent map with a fixed number of independently locked shards.
#[derive(Debug)]
pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<AHashMap<K, V>>>,
}

impl<K, V> ConcurrentMap<K, V> {
    /// Create a map with `shard_count` shards.
    ///
    /// # Panics
    ///
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be positive");
        let shards = (0..shard_count).map(|_| Mutex::new(AHashMap::new())).collect();
        ConcurrentMap { shards }
    }

    /// The number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: ShardKey + Eq + Hash,
    V: Default,
{
    /// Lock the shard for `key` and return a handle to its entry.
    ///
    /// The entry is created with `V::default()` if absent.
    pub fn access(&self, key: K) -> ValueGuard<'_, V> {
        let shard = &self.shards[key.shard_index(self.shards.len())];
        MutexGuard::map(shard.lock(), |map| map.entry(key).or_default())
    }
}

impl<K: Ord, V> ConcurrentMap<K, V> {
    /// Drain every shard into a single ordered map.
    ///
    /// Consuming the map proves no handle is outstanding, so the shard
    /// contents are taken without locking.
    pub fn into_ordered_map(self) -> BTreeMap<K, V> {
        let mut result = BTreeMap::new();
        for shard in self.shards {
            result.extend(shard.into_inner());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rayon::prelude::*;

    #[test]
    fn test_access_creates_default_entry() {
        let map: ConcurrentMap<i64, f64> = ConcurrentMap::new(4);

        assert_eq!(*map.access(7), 0.0);
        *map.access(7) += 1.5;
        assert_eq!(*map.access(7), 1.5);
    }

    #[test]
    fn test_shard_index_uses_absolute_value() {
        assert_eq!((-7i64).shard_index(5), 2);
        assert_eq!(7i64.shard_index(5), 2);
        assert_eq!((-3i32).shard_index(50), 3);
    }

    #[test]
    fn test_into_ordered_map_merges_shards() {
        let map: ConcurrentMap<i64, i32> = ConcurrentMap::new(3);
        for key in [5, -2, 11, 0] {
            *map.access(key) += 1;
        }

        let ordered = map.into_ordered_map();
        let keys: Vec<i64> = ordered.keys().copied().collect();
        assert_eq!(keys, vec![-2, 0, 5, 11]);
    }

    #[test]
    fn test_parallel_accumulation() {
        let map: ConcurrentMap<i64, u64> = ConcurrentMap::new(50);

        (0..1000i64).into_par_iter().for_each(|n| {
            *map.access(n % 10) += 1;
        });

        let ordered = map.into_ordered_map();
        assert_eq!(ordered.len(), 10);
        assert!(ordered.values().all(|&count| count == 100));
    }

    #[test]
    #[should_panic(expected = "shard count must be positive")]
    fn test_zero_shards_panics() {
        let _map: ConcurrentMap<i64, f64> = ConcurrentMap::new(0);
    }
}
