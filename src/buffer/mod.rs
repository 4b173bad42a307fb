//! Buffer management.
//!
//! The buffer manager owns every B-tree and its pages, and multiplexes a
//! fixed pool of slots across them. Pages are pinned into slots to be read
//! or modified.
//!
//! # Components
//! - [`BufferManager`] - Tree registry, page tables, and the slot pool
//! - [`Slot`] - A pool position holding a page copy + metadata
//! - [`PinnedPage`] - Caller's handle on a pinned slot
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII guards for page access
//! - [`BufferStats`] - Pool statistics

mod buffer_manager;
mod page_guard;
mod slot;
mod stats;

pub use buffer_manager::BufferManager;
pub use page_guard::{PageReadGuard, PageWriteGuard};
pub use slot::{PinnedPage, Slot};
pub use stats::{BufferStats, StatsSnapshot};
