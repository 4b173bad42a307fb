//! Slot - one position in the buffer pool.
//!
//! A [`Slot`] holds a private working copy of one page plus the metadata
//! needed for buffer management:
//! - Which tree and page it belongs to
//! - Pinned flag
//! - Dirty flag for write-back tracking
//!
//! [`PinnedPage`] is what a caller gets back from a successful pin.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BTreeId, PageId, SlotId};
use crate::storage::page::Page;

/// An occupied slot in the buffer pool.
///
/// Slots live inside the manager's state and are only touched under its
/// lock, so the flags are plain fields. The page bytes sit behind their own
/// `RwLock` because pinned callers read and write them without holding the
/// manager lock.
///
/// Every pin allocates a fresh working copy. A caller that keeps a
/// [`PinnedPage`] after its slot was emptied writes into an orphaned buffer,
/// never into the next occupant's bytes.
#[derive(Debug)]
pub struct Slot {
    btree: BTreeId,
    page_id: PageId,
    /// Distinguishes successive occupants of the same position.
    pin_seq: u64,
    page: Arc<RwLock<Page>>,
    pinned: bool,
    dirty: bool,
    /// Order of the last dirty unpin across the pool; 0 while clean.
    write_seq: u64,
}

impl Slot {
    /// Load a working copy of `page`, pinned and clean.
    pub(crate) fn load(btree: BTreeId, page_id: PageId, page: &Page, pin_seq: u64) -> Self {
        let mut copy = Page::new();
        copy.copy_from(page);
        Self {
            btree,
            page_id,
            pin_seq,
            page: Arc::new(RwLock::new(copy)),
            pinned: true,
            dirty: false,
            write_seq: 0,
        }
    }

    /// Owning tree.
    #[inline]
    pub fn btree(&self) -> &BTreeId {
        &self.btree
    }

    /// Page held by this slot.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub(crate) fn pin_seq(&self) -> u64 {
        self.pin_seq
    }

    /// Acquire read lock on the working copy.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Read lock on the working copy, or `None` if it is locked for writing.
    #[inline]
    pub(crate) fn try_page(&self) -> Option<RwLockReadGuard<'_, Page>> {
        self.page.try_read()
    }

    #[inline]
    pub(crate) fn page_handle(&self) -> Arc<RwLock<Page>> {
        Arc::clone(&self.page)
    }

    /// Check if this slot belongs to `btree`.
    #[inline]
    pub fn belongs_to(&self, btree: &BTreeId) -> bool {
        self.btree == *btree
    }

    /// Check if this slot holds `page_id` of `btree`.
    #[inline]
    pub fn holds(&self, btree: &BTreeId, page_id: PageId) -> bool {
        self.page_id == page_id && self.belongs_to(btree)
    }

    // ========================================================================
    // Pin / dirty flags
    // ========================================================================

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    #[inline]
    pub(crate) fn unpin(&mut self) {
        self.pinned = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self, write_seq: u64) {
        self.dirty = true;
        self.write_seq = write_seq;
    }

    #[inline]
    pub(crate) fn write_seq(&self) -> u64 {
        self.write_seq
    }
}

/// A page pinned in the buffer pool.
///
/// Gives access to the slot's working copy. Writes stay private to the slot
/// until the page is unpinned with `dirty = true` (or flushed at close).
///
/// A dirty unpin needs to read the working copy. While a guard from
/// [`write`](Self::write) is alive,
/// [`BufferManager::unpin_page`](crate::buffer::BufferManager::unpin_page)
/// with `dirty = true` fails with `Error::PageLocked` and leaves the page
/// pinned.
#[derive(Debug, Clone)]
pub struct PinnedPage {
    btree: BTreeId,
    page_id: PageId,
    slot: SlotId,
    pub(crate) pin_seq: u64,
    pub(crate) page: Arc<RwLock<Page>>,
}

impl PinnedPage {
    pub(crate) fn new(slot_id: SlotId, slot: &Slot) -> Self {
        Self {
            btree: slot.btree.clone(),
            page_id: slot.page_id,
            slot: slot_id,
            pin_seq: slot.pin_seq,
            page: slot.page_handle(),
        }
    }

    /// Position of the slot holding this page. Pass it to `unpin_page`.
    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn btree(&self) -> &BTreeId {
        &self.btree
    }

    /// Shared access to the working copy.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Exclusive access to the working copy.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    /// Copy of the working bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.page.read().as_slice().to_vec()
    }
}
