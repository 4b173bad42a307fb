//! Buffer manager statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the buffer manager.
///
/// All fields are atomic for lock-free, thread-safe updates.
///
/// # Memory Ordering
/// We use `Ordering::Relaxed` for all operations because:
/// - We only need atomicity (no partial updates)
/// - We don't need synchronization between different counters
/// - Statistics are "eventually consistent" - exact ordering doesn't matter
///
/// # Example
/// ```
/// use btree_store::BufferStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferStats::new();
/// stats.pins.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.pins.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct BufferStats {
    /// Successful pins.
    pub pins: AtomicU64,

    /// Successful unpins.
    pub unpins: AtomicU64,

    /// Slot copies written back into a page table by a dirty unpin or a
    /// close flush.
    pub write_backs: AtomicU64,

    /// Pins rejected because no slot was empty.
    pub buffer_full: AtomicU64,

    /// Slots emptied by `free_page` or `delete_btree` while still pinned.
    pub forced_evictions: AtomicU64,
}

impl BufferStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            pins: AtomicU64::new(0),
            unpins: AtomicU64::new(0),
            write_backs: AtomicU64::new(0),
            buffer_full: AtomicU64::new(0),
            forced_evictions: AtomicU64::new(0),
        }
    }

    /// Fraction of pin attempts rejected with `BufferFull` (0.0 to 1.0).
    pub fn rejection_rate(&self) -> f64 {
        self.snapshot().rejection_rate()
    }

    /// Get a snapshot of current statistics.
    ///
    /// This returns a non-atomic copy for display/logging.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pins: self.pins.load(Ordering::Relaxed),
            unpins: self.unpins.load(Ordering::Relaxed),
            write_backs: self.write_backs.load(Ordering::Relaxed),
            buffer_full: self.buffer_full.load(Ordering::Relaxed),
            forced_evictions: self.forced_evictions.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pins.store(0, Ordering::Relaxed);
        self.unpins.store(0, Ordering::Relaxed);
        self.write_backs.store(0, Ordering::Relaxed);
        self.buffer_full.store(0, Ordering::Relaxed);
        self.forced_evictions.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for BufferStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of buffer manager statistics.
///
/// Unlike `BufferStats`, this is not atomic and can be safely
/// printed, compared, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pins: u64,
    pub unpins: u64,
    pub write_backs: u64,
    pub buffer_full: u64,
    pub forced_evictions: u64,
}

impl StatsSnapshot {
    /// Fraction of pin attempts rejected with `BufferFull` (0.0 to 1.0).
    pub fn rejection_rate(&self) -> f64 {
        let total = self.pins + self.buffer_full;
        if total == 0 {
            0.0
        } else {
            self.buffer_full as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ pins: {}, unpins: {}, write_backs: {}, buffer_full: {}, forced: {}, rejected: {:.2}% }}",
            self.pins,
            self.unpins,
            self.write_backs,
            self.buffer_full,
            self.forced_evictions,
            self.rejection_rate() * 100.0
        )
    }
}
