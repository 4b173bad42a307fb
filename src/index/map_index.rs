//! Map-backed index - a correctness stand-in for a real B-tree.
//!
//! [`MapIndex`] satisfies [`IndexStore`] over a plain `HashMap`. It keeps no
//! ordering: every scan collects and sorts the matching keys. It never
//! splits, merges, or persists nodes.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::common::Result;
use crate::index::{IndexStore, KeyValuePair, RangeScan};

/// In-memory index over a hash map.
///
/// # Complexity
/// - `lookup` / `insert`: O(1) average
/// - `scan`: O(n log n) per call, where n is the number of matching keys
///
/// # Thread Safety
/// The map sits behind a `RwLock`. `scan` copies the matching pairs out and
/// releases the lock before streaming, so a consumer can keep inserting into
/// the same index while a scan is open. The scan sees the state at the
/// moment it was started.
#[derive(Debug, Default)]
pub struct MapIndex {
    data: RwLock<HashMap<u64, u64>>,
}

impl MapIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl IndexStore for MapIndex {
    fn lookup(&self, key: u64) -> Option<u64> {
        self.data.read().get(&key).copied()
    }

    fn insert(&self, key: u64, value: u64) -> Result<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    fn scan(&self, min_key: u64, max_key: u64) -> Result<RangeScan> {
        if min_key > max_key {
            return Ok(RangeScan::empty());
        }

        let mut pairs: Vec<KeyValuePair> = {
            let data = self.data.read();
            data.iter()
                .filter(|&(&k, _)| (min_key..=max_key).contains(&k))
                .map(|(&key, &value)| KeyValuePair { key, value })
                .collect()
        };
        pairs.sort_unstable_by_key(|kv| kv.key);

        trace!(min_key, max_key, matched = pairs.len(), "map index scan");
        RangeScan::from_sorted(pairs)
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(index: &MapIndex, min: u64, max: u64) -> Vec<(u64, u64)> {
        index
            .scan(min, max)
            .unwrap()
            .map(|kv| (kv.key, kv.value))
            .collect()
    }

    fn sample() -> MapIndex {
        let index = MapIndex::new();
        for (k, v) in [(10, 100), (20, 200), (30, 300), (40, 400), (50, 500)] {
            index.insert(k, v).unwrap();
        }
        index
    }

    #[test]
    fn test_lookup_missing() {
        let index = MapIndex::new();
        assert_eq!(index.lookup(1), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_and_overwrite() {
        let index = MapIndex::new();
        index.insert(7, 70).unwrap();
        assert_eq!(index.lookup(7), Some(70));

        index.insert(7, 71).unwrap();
        assert_eq!(index.lookup(7), Some(71));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_scan_sub_range() {
        let index = sample();
        assert_eq!(collect(&index, 20, 40), vec![(20, 200), (30, 300), (40, 400)]);
    }

    #[test]
    fn test_scan_covering_range() {
        let index = sample();
        assert_eq!(
            collect(&index, 0, 100),
            vec![(10, 100), (20, 200), (30, 300), (40, 400), (50, 500)]
        );
    }

    #[test]
    fn test_scan_no_matches() {
        let index = sample();
        assert!(collect(&index, 60, 70).is_empty());
    }

    #[test]
    fn test_scan_inverted_range_is_empty() {
        let index = sample();
        assert!(collect(&index, 40, 20).is_empty());
    }

    #[test]
    fn test_scan_single_key_bounds() {
        let index = sample();
        assert_eq!(collect(&index, 30, 30), vec![(30, 300)]);
        assert_eq!(collect(&index, u64::MIN, u64::MAX).len(), 5);
    }

    #[test]
    fn test_insert_while_scan_open() {
        let index = sample();
        let mut scan = index.scan(0, 100).unwrap();
        assert_eq!(scan.next().map(|kv| kv.key), Some(10));

        // The write lock is free even though the scan is mid-stream.
        index.insert(15, 150).unwrap();

        let rest: Vec<u64> = scan.map(|kv| kv.key).collect();
        assert_eq!(rest, vec![20, 30, 40, 50]);
        assert_eq!(index.lookup(15), Some(150));
    }
}
