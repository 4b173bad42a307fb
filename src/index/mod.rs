//! Ordered key/value index stores.
//!
//! # Components
//! - [`IndexStore`] - The contract every ordered u64 → u64 container meets
//! - [`KeyValuePair`] - One entry yielded by a scan
//! - [`RangeScan`] - Pull-based, cancellable ascending scan
//! - [`MapIndex`] - Map-backed stand-in for a real B-tree

mod map_index;
mod scan;

pub use map_index::MapIndex;
pub use scan::RangeScan;

use std::fmt;

use crate::common::Result;

/// A key-value pair stored in an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValuePair {
    pub key: u64,
    pub value: u64,
}

impl KeyValuePair {
    #[inline]
    pub fn new(key: u64, value: u64) -> Self {
        Self { key, value }
    }
}

impl From<(u64, u64)> for KeyValuePair {
    fn from((key, value): (u64, u64)) -> Self {
        Self { key, value }
    }
}

/// An ordered map from `u64` keys to `u64` values.
///
/// Implementations synchronize internally, so a store handed out by the
/// buffer manager can be shared across threads behind an `Arc`.
pub trait IndexStore: fmt::Debug + Send + Sync {
    /// Find the value associated with `key`, or `None` if absent.
    fn lookup(&self, key: u64) -> Option<u64>;

    /// Insert `key`, overwriting any existing value.
    ///
    /// # Errors
    /// Only if the underlying storage reports a fault.
    fn insert(&self, key: u64, value: u64) -> Result<()>;

    /// Stream every pair with `min_key <= key <= max_key` in ascending key
    /// order. `min_key > max_key` yields an empty scan.
    ///
    /// # Errors
    /// Only if the scan's producer cannot be started.
    fn scan(&self, min_key: u64, max_key: u64) -> Result<RangeScan>;

    /// Number of keys stored.
    fn len(&self) -> usize;

    /// Check if the store holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
