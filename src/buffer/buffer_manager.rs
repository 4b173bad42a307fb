//! Buffer Manager - owns B-trees, their pages, and the slot pool.
//!
//! The [`BufferManager`] provides:
//! - B-tree lifecycle (create, open, close, delete)
//! - Per-tree page allocation with dense, never-reused page ids
//! - A fixed pool of slots that pages are pinned into
//! - Write-through of dirty slots on unpin, and flush on close

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::{BufferStats, PageReadGuard, PageWriteGuard, PinnedPage, Slot};
use crate::common::{BTreeId, BufferManagerConfig, Error, PageId, Result, SlotId};
use crate::index::{IndexStore, MapIndex};
use crate::storage::PageTable;

/// A registered B-tree: its index and its pages.
struct TreeEntry {
    index: Arc<dyn IndexStore>,
    pages: PageTable,
}

/// Everything guarded by the manager lock.
struct ManagerState {
    trees: HashMap<BTreeId, TreeEntry>,
    /// Fixed length `buffer_size`; `None` is an empty slot.
    slots: Vec<Option<Slot>>,
    /// Sequence number of the last tree created.
    btree_seq: u64,
    /// Sequence number of the last successful pin.
    pin_seq: u64,
    /// Sequence number of the last dirty unpin.
    write_seq: u64,
}

impl ManagerState {
    fn tree(&self, btree: &BTreeId) -> Result<&TreeEntry> {
        self.trees
            .get(btree)
            .ok_or_else(|| Error::TreeNotFound(btree.clone()))
    }

    fn tree_mut(&mut self, btree: &BTreeId) -> Result<&mut TreeEntry> {
        self.trees
            .get_mut(btree)
            .ok_or_else(|| Error::TreeNotFound(btree.clone()))
    }
}

/// Copy a slot's working bytes into its tree's page table.
///
/// Never blocks on the working copy: if a caller still holds it for
/// writing, fails with `Error::PageLocked` and the page table is untouched.
fn write_back(
    trees: &mut HashMap<BTreeId, TreeEntry>,
    slot: &Slot,
    pos: SlotId,
    stats: &BufferStats,
) -> Result<()> {
    let page = slot.try_page().ok_or(Error::PageLocked(pos))?;
    let tree = trees
        .get_mut(slot.btree())
        .ok_or_else(|| Error::TreeNotFound(slot.btree().clone()))?;
    tree.pages.write_page(slot.page_id(), &page)?;
    BufferStats::incr(&stats.write_backs);
    Ok(())
}

/// Manages B-trees and a fixed pool of buffer slots for their pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                       BufferManager                         │
/// │  ┌────────────────────────┐  ┌──────────────────────────┐   │
/// │  │ trees                  │  │ slots: Vec<Option<Slot>> │   │
/// │  │ BTreeId → index        │◀─│ [S0] [S1] [ - ] [S3] ... │   │
/// │  │         → PageTable    │  │ (btree, page, pin, dirty)│   │
/// │  └────────────────────────┘  └──────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
/// │  │  btree_seq   │  │   pin_seq    │  │    stats     │       │
/// │  └──────────────┘  └──────────────┘  └──────────────┘       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Slot policy
/// `pin_page` takes the first empty slot and fails with `Error::BufferFull`
/// when there is none. There is no eviction: an unpinned page keeps its
/// slot until `close_btree`, `free_page`, or `delete_btree` releases it.
///
/// # Thread Safety
/// - `state`: one `Mutex` over trees, page tables, and slots; every
///   operation is atomic with respect to every other
/// - slot working copies: own `RwLock`, taken after `state` when both are
///   needed
/// - index stores: synchronize internally
/// - `stats`: no lock, all atomic counters
///
/// # Usage
/// ```
/// use btree_store::BufferManager;
///
/// let bm = BufferManager::new();
/// let tree = bm.create_btree().unwrap();
/// let pid = bm.allocate_page(&tree).unwrap();
///
/// let pinned = bm.pin_page(&tree, pid).unwrap();
/// pinned.write().as_mut_slice()[0] = 0xAB;
/// bm.unpin_page(pinned.slot(), true).unwrap();
///
/// assert_eq!(bm.read_page(&tree, pid).unwrap()[0], 0xAB);
/// ```
pub struct BufferManager {
    state: Mutex<ManagerState>,

    /// Immutable after construction.
    config: BufferManagerConfig,

    stats: BufferStats,
}

impl BufferManager {
    /// Create a manager with the default configuration (10 slots).
    pub fn new() -> Self {
        Self::with_config(BufferManagerConfig::default())
    }

    /// Create a manager with an explicit configuration.
    pub fn with_config(config: BufferManagerConfig) -> Self {
        let slots = (0..config.buffer_size()).map(|_| None).collect();
        debug!(
            buffer_size = config.buffer_size(),
            directory = %config.directory().display(),
            "buffer manager created"
        );

        Self {
            state: Mutex::new(ManagerState {
                trees: HashMap::new(),
                slots,
                btree_seq: 0,
                pin_seq: 0,
                write_seq: 0,
            }),
            config,
            stats: BufferStats::new(),
        }
    }

    // ========================================================================
    // Public API: B-tree lifecycle
    // ========================================================================

    /// Create a new empty B-tree and return its handle.
    pub fn create_btree(&self) -> Result<BTreeId> {
        let mut state = self.state.lock();
        state.btree_seq += 1;
        let btree = BTreeId::from_seq(state.btree_seq);

        state.trees.insert(
            btree.clone(),
            TreeEntry {
                index: Arc::new(MapIndex::new()),
                pages: PageTable::new(btree.clone()),
            },
        );

        debug!(%btree, "created btree");
        Ok(btree)
    }

    /// Open an existing B-tree.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    pub fn open_btree(&self, btree: &BTreeId) -> Result<Arc<dyn IndexStore>> {
        let state = self.state.lock();
        Ok(Arc::clone(&state.tree(btree)?.index))
    }

    /// Permanently remove a B-tree, its pages, and every slot it occupies.
    ///
    /// Slots are emptied even if pinned: the data is being destroyed.
    /// Stale slot positions then report `Error::SlotEmpty` on unpin.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    pub fn delete_btree(&self, btree: &BTreeId) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .trees
            .remove(btree)
            .ok_or_else(|| Error::TreeNotFound(btree.clone()))?;

        let mut evicted = 0usize;
        for slot in state.slots.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.belongs_to(btree)) {
                if let Some(old) = slot.take() {
                    if old.is_pinned() {
                        BufferStats::incr(&self.stats.forced_evictions);
                        warn!(%btree, page_id = %old.page_id(), "deleting btree with pinned page");
                    }
                    evicted += 1;
                }
            }
        }

        debug!(%btree, pages = entry.pages.page_count(), evicted, "deleted btree");
        Ok(())
    }

    /// Close a B-tree: flush its dirty slots and empty all of them.
    ///
    /// The tree stays registered and can be opened again.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    /// - `Error::PagesStillPinned` if any of its slots is pinned
    /// - `Error::PageLocked` if a dirty working copy is still locked for
    ///   writing; that slot and any not yet flushed stay resident
    pub fn close_btree(&self, btree: &BTreeId) -> Result<()> {
        let mut state = self.state.lock();
        state.tree(btree)?;

        let pinned = state
            .slots
            .iter()
            .flatten()
            .any(|s| s.belongs_to(btree) && s.is_pinned());
        if pinned {
            return Err(Error::PagesStillPinned(btree.clone()));
        }

        let ManagerState { trees, slots, .. } = &mut *state;

        // Replay in dirty-unpin order, so the copy unpinned last wins.
        let mut owned: Vec<usize> = (0..slots.len())
            .filter(|&pos| slots[pos].as_ref().is_some_and(|s| s.belongs_to(btree)))
            .collect();
        owned.sort_by_key(|&pos| slots[pos].as_ref().map(Slot::write_seq));

        let mut flushed = 0usize;
        for pos in owned {
            if let Some(slot) = slots[pos].as_ref().filter(|s| s.is_dirty()) {
                write_back(trees, slot, SlotId::new(pos), &self.stats)?;
                flushed += 1;
            }
            slots[pos] = None;
        }

        debug!(%btree, flushed, "closed btree");
        Ok(())
    }

    // ========================================================================
    // Public API: Pages
    // ========================================================================

    /// Allocate a new zero-filled page for a B-tree.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    pub fn allocate_page(&self, btree: &BTreeId) -> Result<PageId> {
        let mut state = self.state.lock();
        let page_id = state.tree_mut(btree)?.pages.allocate_page();
        trace!(%btree, %page_id, "allocated page");
        Ok(page_id)
    }

    /// Free a page. Any slot holding it is emptied, pinned or not.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    /// - `Error::PageNotFound` if the page is not allocated
    pub fn free_page(&self, btree: &BTreeId, page_id: PageId) -> Result<()> {
        let mut state = self.state.lock();
        let ManagerState { trees, slots, .. } = &mut *state;
        let tree = trees
            .get_mut(btree)
            .ok_or_else(|| Error::TreeNotFound(btree.clone()))?;
        tree.pages.free_page(page_id)?;

        for slot in slots.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.holds(btree, page_id)) {
                if let Some(old) = slot.take() {
                    if old.is_pinned() {
                        BufferStats::incr(&self.stats.forced_evictions);
                        warn!(%btree, %page_id, "freed page while pinned");
                    }
                }
            }
        }

        trace!(%btree, %page_id, "freed page");
        Ok(())
    }

    /// Copy of a page's committed bytes (the page table, not a slot).
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    /// - `Error::PageNotFound` if the page is not allocated
    pub fn read_page(&self, btree: &BTreeId, page_id: PageId) -> Result<Vec<u8>> {
        let state = self.state.lock();
        let page = state.tree(btree)?.pages.read_page(page_id)?;
        Ok(page.as_slice().to_vec())
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Load a page into the pool and pin it.
    ///
    /// The returned [`PinnedPage`] exposes the slot position and the slot's
    /// private working copy.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    /// - `Error::PageNotFound` if the page is not allocated
    /// - `Error::BufferFull` if no slot is empty
    pub fn pin_page(&self, btree: &BTreeId, page_id: PageId) -> Result<PinnedPage> {
        let mut state = self.state.lock();
        let ManagerState {
            trees,
            slots,
            pin_seq,
            ..
        } = &mut *state;

        let tree = trees
            .get(btree)
            .ok_or_else(|| Error::TreeNotFound(btree.clone()))?;
        if !tree.pages.contains(page_id) {
            return Err(Error::PageNotFound {
                btree: btree.clone(),
                page_id,
            });
        }

        let Some(pos) = slots.iter().position(Option::is_none) else {
            BufferStats::incr(&self.stats.buffer_full);
            warn!(%btree, %page_id, capacity = slots.len(), "buffer full");
            return Err(Error::BufferFull {
                capacity: slots.len(),
            });
        };

        let page = tree.pages.read_page(page_id)?;

        *pin_seq += 1;
        let slot = Slot::load(btree.clone(), page_id, page, *pin_seq);
        let slot_id = SlotId::new(pos);
        let pinned = PinnedPage::new(slot_id, &slot);
        slots[pos] = Some(slot);

        BufferStats::incr(&self.stats.pins);
        trace!(%btree, %page_id, %slot_id, "pinned page");
        Ok(pinned)
    }

    /// Unpin the page at a slot position.
    ///
    /// With `dirty = true` the slot is marked dirty and its bytes are
    /// written through to the page table immediately. The page stays
    /// resident, holding its slot, until the page is freed or the tree is
    /// closed or deleted.
    ///
    /// # Errors
    /// - `Error::SlotEmpty` if the position holds no page
    /// - `Error::SlotNotPinned` if the page is not pinned
    /// - `Error::PageLocked` if `dirty` is set and the working copy is still
    ///   locked for writing; the page stays pinned
    pub fn unpin_page(&self, slot: SlotId, dirty: bool) -> Result<()> {
        let mut state = self.state.lock();
        self.unpin_locked(&mut state, slot, dirty)
    }

    /// Pin a page and return a read guard that unpins (clean) on drop.
    ///
    /// # Errors
    /// Same as [`pin_page`](Self::pin_page).
    pub fn fetch_page_read(&self, btree: &BTreeId, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let pinned = self.pin_page(btree, page_id)?;
        Ok(PageReadGuard::new(self, pinned))
    }

    /// Pin a page and return a write guard that unpins dirty on drop.
    ///
    /// # Errors
    /// Same as [`pin_page`](Self::pin_page).
    pub fn fetch_page_write(
        &self,
        btree: &BTreeId,
        page_id: PageId,
    ) -> Result<PageWriteGuard<'_>> {
        let pinned = self.pin_page(btree, page_id)?;
        Ok(PageWriteGuard::new(self, pinned))
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    pub fn config(&self) -> &BufferManagerConfig {
        &self.config
    }

    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Number of slots in the pool.
    pub fn buffer_size(&self) -> usize {
        self.config.buffer_size()
    }

    /// Number of slots holding no page.
    pub fn free_slot_count(&self) -> usize {
        self.state.lock().slots.iter().filter(|s| s.is_none()).count()
    }

    /// Number of slots holding a pinned page.
    pub fn pinned_slot_count(&self) -> usize {
        self.state
            .lock()
            .slots
            .iter()
            .flatten()
            .filter(|s| s.is_pinned())
            .count()
    }

    /// Check if the slot holds a pinned page.
    pub fn is_pinned(&self, slot: SlotId) -> bool {
        self.with_slot(slot, Slot::is_pinned).unwrap_or(false)
    }

    /// Check if the slot holds a dirty page.
    pub fn is_dirty(&self, slot: SlotId) -> bool {
        self.with_slot(slot, Slot::is_dirty).unwrap_or(false)
    }

    /// Tree and page held by a slot, or `None` if the slot is empty.
    pub fn slot_occupant(&self, slot: SlotId) -> Option<(BTreeId, PageId)> {
        self.with_slot(slot, |s| (s.btree().clone(), s.page_id()))
    }

    /// Number of pages allocated to a B-tree.
    ///
    /// # Errors
    /// - `Error::TreeNotFound` if the handle is unknown
    pub fn page_count(&self, btree: &BTreeId) -> Result<usize> {
        Ok(self.state.lock().tree(btree)?.pages.page_count())
    }

    /// Number of registered B-trees.
    pub fn btree_count(&self) -> usize {
        self.state.lock().trees.len()
    }

    /// Handles of all registered B-trees, sorted.
    pub fn btree_ids(&self) -> Vec<BTreeId> {
        let mut ids: Vec<BTreeId> = self.state.lock().trees.keys().cloned().collect();
        ids.sort();
        ids
    }

    // ========================================================================
    // Internal: Called by page guards on drop
    // ========================================================================

    /// Unpin on behalf of a guard.
    ///
    /// Only unpins if the slot still holds the occupant the guard pinned; a
    /// slot emptied by `free_page`/`delete_btree` (and possibly refilled)
    /// is left alone.
    pub(crate) fn release_lease(&self, pinned: &PinnedPage, dirty: bool) {
        let mut state = self.state.lock();
        let slot = pinned.slot();
        let current = state
            .slots
            .get(slot.index())
            .and_then(Option::as_ref)
            .map(Slot::pin_seq);

        if current != Some(pinned.pin_seq) {
            warn!(
                btree = %pinned.btree(),
                page_id = %pinned.page_id(),
                %slot,
                "page guard dropped after its slot was emptied"
            );
            return;
        }

        if let Err(err) = self.unpin_locked(&mut state, slot, dirty) {
            warn!(%slot, error = %err, "page guard failed to unpin");
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn unpin_locked(&self, state: &mut ManagerState, slot: SlotId, dirty: bool) -> Result<()> {
        let ManagerState {
            trees,
            slots,
            write_seq,
            ..
        } = state;
        let occupant = slots
            .get_mut(slot.index())
            .and_then(Option::as_mut)
            .ok_or(Error::SlotEmpty(slot))?;

        if !occupant.is_pinned() {
            return Err(Error::SlotNotPinned(slot));
        }

        if dirty {
            write_back(trees, occupant, slot, &self.stats)?;
            *write_seq += 1;
            occupant.mark_dirty(*write_seq);
        }
        occupant.unpin();

        BufferStats::incr(&self.stats.unpins);
        trace!(%slot, dirty, "unpinned page");
        Ok(())
    }

    fn with_slot<T>(&self, slot: SlotId, f: impl FnOnce(&Slot) -> T) -> Option<T> {
        let state = self.state.lock();
        state.slots.get(slot.index()).and_then(Option::as_ref).map(f)
    }
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::new()
    }
}
