//! RAII guards for page access.
//!
//! These guards pin a page and hold a lock on its working copy:
//! - [`PageReadGuard`] - Shared read access, unpins clean
//! - [`PageWriteGuard`] - Exclusive write access, unpins dirty
//!
//! Both guards release the lock and then unpin when dropped. Field order
//! matters: `lock` is declared before `lease`, so the page lock is gone by
//! the time the lease writes the page back.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::RawRwLock;

use crate::common::{BTreeId, PageId, SlotId};
use crate::storage::page::Page;

use super::buffer_manager::BufferManager;
use super::slot::PinnedPage;

/// Unpins on drop.
struct PinLease<'a> {
    bm: &'a BufferManager,
    pinned: PinnedPage,
    dirty: bool,
}

impl Drop for PinLease<'_> {
    fn drop(&mut self) {
        self.bm.release_lease(&self.pinned, self.dirty);
    }
}

/// Guard for read-only page access.
///
/// # Example
/// ```
/// use btree_store::BufferManager;
///
/// let bm = BufferManager::new();
/// let tree = bm.create_btree().unwrap();
/// let pid = bm.allocate_page(&tree).unwrap();
///
/// let guard = bm.fetch_page_read(&tree, pid).unwrap();
/// assert_eq!(guard.as_slice()[0], 0);
/// // guard drops here, page unpinned
/// ```
pub struct PageReadGuard<'a> {
    lock: ArcRwLockReadGuard<RawRwLock, Page>,
    lease: PinLease<'a>,
}

impl<'a> PageReadGuard<'a> {
    /// Called by `BufferManager::fetch_page_read()`.
    pub(crate) fn new(bm: &'a BufferManager, pinned: PinnedPage) -> Self {
        let lock = pinned.page.read_arc();
        Self {
            lock,
            lease: PinLease {
                bm,
                pinned,
                dirty: false,
            },
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.lease.pinned.page_id()
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.lease.pinned.slot()
    }

    #[inline]
    pub fn btree(&self) -> &BTreeId {
        self.lease.pinned.btree()
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl fmt::Debug for PageReadGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageReadGuard")
            .field("btree", self.btree())
            .field("page_id", &self.page_id())
            .field("slot", &self.slot())
            .finish()
    }
}

/// Guard for exclusive write access to a page.
///
/// The page is marked dirty, written back to its page table, and unpinned
/// when the guard is dropped.
///
/// # Example
/// ```
/// use btree_store::BufferManager;
///
/// let bm = BufferManager::new();
/// let tree = bm.create_btree().unwrap();
/// let pid = bm.allocate_page(&tree).unwrap();
///
/// {
///     let mut guard = bm.fetch_page_write(&tree, pid).unwrap();
///     guard.as_mut_slice()[0] = 0xFF;
/// }
/// assert_eq!(bm.read_page(&tree, pid).unwrap()[0], 0xFF);
/// ```
pub struct PageWriteGuard<'a> {
    lock: ArcRwLockWriteGuard<RawRwLock, Page>,
    lease: PinLease<'a>,
}

impl<'a> PageWriteGuard<'a> {
    /// Called by `BufferManager::fetch_page_write()`.
    pub(crate) fn new(bm: &'a BufferManager, pinned: PinnedPage) -> Self {
        let lock = pinned.page.write_arc();
        Self {
            lock,
            lease: PinLease {
                bm,
                pinned,
                dirty: true,
            },
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.lease.pinned.page_id()
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.lease.pinned.slot()
    }

    #[inline]
    pub fn btree(&self) -> &BTreeId {
        self.lease.pinned.btree()
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}

impl fmt::Debug for PageWriteGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageWriteGuard")
            .field("btree", self.btree())
            .field("page_id", &self.page_id())
            .field("slot", &self.slot())
            .finish()
    }
}
