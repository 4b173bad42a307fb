//! btree-store - B-tree index instances multiplexed over a page buffer pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          btree-store                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/)                        │   │
//! │  │    IndexStore: lookup / insert / scan → RangeScan        │   │
//! │  │              MapIndex (map-backed stand-in)              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↑ owned per tree                   │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Layer (buffer/)                      │   │
//! │  │   BufferManager: create/open/close/delete trees          │   │
//! │  │                  allocate/free/pin/unpin pages           │   │
//! │  │   Slot pool (fixed size, no eviction) + Statistics       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │          Page (4KB) + PageTable per tree                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index layer and the page pool are independent: a tree's pages are
//! plain bytes and never hold its keys.
//!
//! # Modules
//! - [`common`] - Shared primitives (ids, Error, config)
//! - [`buffer`] - Buffer manager, slots, guards, statistics
//! - [`storage`] - Pages and page tables
//! - [`index`] - Index store contract and map-backed index
//!
//! # Quick Start
//! ```
//! use btree_store::{BufferManager, BufferManagerConfig};
//!
//! let bm = BufferManager::with_config(BufferManagerConfig::default().with_buffer_size(4));
//!
//! let tree = bm.create_btree().unwrap();
//! let index = bm.open_btree(&tree).unwrap();
//! index.insert(10, 100).unwrap();
//! assert_eq!(index.lookup(10), Some(100));
//!
//! let pid = bm.allocate_page(&tree).unwrap();
//! let pinned = bm.pin_page(&tree, pid).unwrap();
//! bm.unpin_page(pinned.slot(), false).unwrap();
//! bm.close_btree(&tree).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use buffer::{
    BufferManager, BufferStats, PageReadGuard, PageWriteGuard, PinnedPage, StatsSnapshot,
};
pub use common::config::PAGE_SIZE;
pub use common::{BTreeId, BufferManagerConfig, Error, ErrorKind, PageId, Result, SlotId};
pub use index::{IndexStore, KeyValuePair, MapIndex, RangeScan};
pub use storage::page::Page;
