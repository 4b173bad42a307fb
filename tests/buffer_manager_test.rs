//! Buffer Manager Tests
//!
//! Lifecycle, pin/unpin, and page allocation behaviour through the public
//! API only.

use btree_store::{BTreeId, BufferManager, BufferManagerConfig, Error, ErrorKind, PageId, SlotId};

const SLOTS: usize = 10;

fn create_bm(buffer_size: usize) -> BufferManager {
    BufferManager::with_config(BufferManagerConfig::default().with_buffer_size(buffer_size))
}

/// Helper to write a string to page data.
fn copy_string(data: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    data[..bytes.len()].copy_from_slice(bytes);
    data[bytes.len()] = 0; // null terminator
}

/// Helper to read a null-terminated string from page data.
fn read_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

// ============================================================================
// B-tree lifecycle
// ============================================================================

#[test]
fn test_create_and_open_btree() {
    let bm = create_bm(SLOTS);

    let tree = bm.create_btree().unwrap();
    assert!(!tree.as_str().is_empty());

    let index = bm.open_btree(&tree).unwrap();
    assert!(index.is_empty());
}

#[test]
fn test_open_nonexistent_btree() {
    let bm = create_bm(SLOTS);

    let err = bm.open_btree(&BTreeId::from("nonexistent")).unwrap_err();
    assert!(matches!(err, Error::TreeNotFound(_)));
}

#[test]
fn test_delete_btree() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    bm.delete_btree(&tree).unwrap();

    assert_eq!(bm.delete_btree(&tree).unwrap_err().kind(), ErrorKind::TreeNotFound);
    assert_eq!(bm.open_btree(&tree).unwrap_err().kind(), ErrorKind::TreeNotFound);
    assert_eq!(
        bm.delete_btree(&BTreeId::from("nonexistent")).unwrap_err().kind(),
        ErrorKind::TreeNotFound
    );
}

#[test]
fn test_deleted_handle_never_reused() {
    let bm = create_bm(SLOTS);

    let mut seen = Vec::new();
    for _ in 0..5 {
        let tree = bm.create_btree().unwrap();
        assert!(!seen.contains(&tree));
        bm.delete_btree(&tree).unwrap();
        seen.push(tree);
    }
    assert_eq!(bm.btree_count(), 0);
}

#[test]
fn test_open_returns_same_index() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    bm.open_btree(&tree).unwrap().insert(1, 11).unwrap();
    assert_eq!(bm.open_btree(&tree).unwrap().lookup(1), Some(11));
}

#[test]
fn test_trees_are_isolated() {
    let bm = create_bm(SLOTS);
    let t1 = bm.create_btree().unwrap();
    let t2 = bm.create_btree().unwrap();

    bm.open_btree(&t1).unwrap().insert(5, 50).unwrap();
    assert_eq!(bm.open_btree(&t2).unwrap().lookup(5), None);
    assert_eq!(bm.btree_ids(), vec![t1, t2]);
}

#[test]
fn test_close_btree() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    bm.close_btree(&tree).unwrap();
    assert_eq!(
        bm.close_btree(&BTreeId::from("nonexistent")).unwrap_err().kind(),
        ErrorKind::TreeNotFound
    );
}

#[test]
fn test_close_fails_while_pinned_then_succeeds() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();
    let p1 = bm.allocate_page(&tree).unwrap();
    let p2 = bm.allocate_page(&tree).unwrap();

    let a = bm.pin_page(&tree, p1).unwrap();
    let b = bm.pin_page(&tree, p2).unwrap();

    assert_eq!(bm.close_btree(&tree).unwrap_err().kind(), ErrorKind::Conflict);
    bm.unpin_page(a.slot(), false).unwrap();
    assert_eq!(bm.close_btree(&tree).unwrap_err().kind(), ErrorKind::Conflict);
    bm.unpin_page(b.slot(), true).unwrap();

    bm.close_btree(&tree).unwrap();
    assert_eq!(bm.free_slot_count(), SLOTS);
}

// ============================================================================
// Pages
// ============================================================================

#[test]
fn test_allocate_page() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    let pid = bm.allocate_page(&tree).unwrap();
    assert_eq!(pid, PageId::new(1));

    let bytes = bm.read_page(&tree, pid).unwrap();
    assert_eq!(bytes.len(), btree_store::PAGE_SIZE);
    assert!(bytes.iter().all(|&b| b == 0));
}

#[test]
fn test_allocate_page_unknown_tree() {
    let bm = create_bm(SLOTS);
    let err = bm.allocate_page(&BTreeId::from("nonexistent")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TreeNotFound);
}

#[test]
fn test_page_ids_dense_and_never_reused() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    let ids: Vec<PageId> = (0..4).map(|_| bm.allocate_page(&tree).unwrap()).collect();
    assert_eq!(ids, (1..=4).map(PageId::new).collect::<Vec<_>>());

    bm.free_page(&tree, ids[3]).unwrap();
    bm.free_page(&tree, ids[1]).unwrap();
    assert_eq!(bm.allocate_page(&tree).unwrap(), PageId::new(5));
}

#[test]
fn test_free_page_errors() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    let err = bm.free_page(&tree, PageId::new(9)).unwrap_err();
    assert!(matches!(err, Error::PageNotFound { .. }));

    let err = bm
        .free_page(&BTreeId::from("nonexistent"), PageId::new(1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TreeNotFound);
}

#[test]
fn test_free_then_pin_fails() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();

    bm.free_page(&tree, pid).unwrap();
    assert_eq!(bm.pin_page(&tree, pid).unwrap_err().kind(), ErrorKind::PageNotFound);
}

// ============================================================================
// Pin / unpin
// ============================================================================

#[test]
fn test_pin_errors() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();

    let err = bm.pin_page(&tree, PageId::new(999)).unwrap_err();
    assert!(matches!(err, Error::PageNotFound { .. }));

    let err = bm
        .pin_page(&BTreeId::from("nonexistent"), PageId::new(1))
        .unwrap_err();
    assert!(matches!(err, Error::TreeNotFound(_)));
}

#[test]
fn test_pin_returns_current_bytes() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();

    let pinned = bm.pin_page(&tree, pid).unwrap();
    copy_string(pinned.write().as_mut_slice(), "Hello, world!");
    bm.unpin_page(pinned.slot(), true).unwrap();

    let again = bm.pin_page(&tree, pid).unwrap();
    assert_eq!(read_string(&again.to_vec()), "Hello, world!");
    assert_eq!(again.page_id(), pid);
    assert_eq!(again.btree(), &tree);
}

#[test]
fn test_unpin_not_pinned() {
    let bm = create_bm(SLOTS);

    let err = bm.unpin_page(SlotId::new(1000), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PageNotFound);

    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();
    let pinned = bm.pin_page(&tree, pid).unwrap();
    bm.unpin_page(pinned.slot(), true).unwrap();

    let err = bm.unpin_page(pinned.slot(), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_pin_beyond_capacity() {
    let bm = create_bm(3);
    let tree = bm.create_btree().unwrap();
    let pids: Vec<PageId> = (0..4).map(|_| bm.allocate_page(&tree).unwrap()).collect();

    let pinned: Vec<_> = pids[..3]
        .iter()
        .map(|&pid| bm.pin_page(&tree, pid).unwrap())
        .collect();
    let slots: Vec<SlotId> = pinned.iter().map(|p| p.slot()).collect();
    assert_eq!(slots, vec![SlotId::new(0), SlotId::new(1), SlotId::new(2)]);

    let err = bm.pin_page(&tree, pids[3]).unwrap_err();
    assert!(matches!(err, Error::BufferFull { capacity: 3 }));

    // An unpinned page keeps its slot; only freeing it makes room.
    bm.unpin_page(pinned[1].slot(), false).unwrap();
    assert_eq!(bm.pin_page(&tree, pids[3]).unwrap_err().kind(), ErrorKind::BufferFull);

    bm.free_page(&tree, pids[1]).unwrap();
    let next = bm.pin_page(&tree, pids[3]).unwrap();
    assert_eq!(next.slot(), SlotId::new(1));

    assert_eq!(bm.pin_page(&tree, pids[0]).unwrap_err().kind(), ErrorKind::BufferFull);
}

#[test]
fn test_unpin_then_pin_after_close() {
    let bm = create_bm(2);
    let tree = bm.create_btree().unwrap();
    let pids: Vec<PageId> = (0..3).map(|_| bm.allocate_page(&tree).unwrap()).collect();

    for &pid in &pids[..2] {
        let pinned = bm.pin_page(&tree, pid).unwrap();
        copy_string(pinned.write().as_mut_slice(), "kept");
        bm.unpin_page(pinned.slot(), true).unwrap();
    }
    assert_eq!(bm.free_slot_count(), 0);
    assert_eq!(bm.pin_page(&tree, pids[2]).unwrap_err().kind(), ErrorKind::BufferFull);

    bm.close_btree(&tree).unwrap();
    let pinned = bm.pin_page(&tree, pids[2]).unwrap();
    assert_eq!(pinned.slot(), SlotId::new(0));
    assert_eq!(read_string(&bm.read_page(&tree, pids[1]).unwrap()), "kept");
}

#[test]
fn test_pool_shared_across_trees() {
    let bm = create_bm(2);
    let t1 = bm.create_btree().unwrap();
    let t2 = bm.create_btree().unwrap();
    let p1 = bm.allocate_page(&t1).unwrap();
    let p2 = bm.allocate_page(&t2).unwrap();
    let p3 = bm.allocate_page(&t2).unwrap();

    let _a = bm.pin_page(&t1, p1).unwrap();
    let _b = bm.pin_page(&t2, p2).unwrap();
    assert_eq!(bm.pin_page(&t2, p3).unwrap_err().kind(), ErrorKind::BufferFull);

    // Deleting t1 frees its slot even though it is pinned.
    bm.delete_btree(&t1).unwrap();
    assert!(bm.pin_page(&t2, p3).is_ok());
}

#[test]
fn test_dirty_visible_only_after_unpin() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();

    let pinned = bm.pin_page(&tree, pid).unwrap();
    copy_string(pinned.write().as_mut_slice(), "draft");
    assert_eq!(read_string(&bm.read_page(&tree, pid).unwrap()), "");

    bm.unpin_page(pinned.slot(), true).unwrap();
    assert_eq!(read_string(&bm.read_page(&tree, pid).unwrap()), "draft");
}

#[test]
fn test_guards_round_trip() {
    let bm = create_bm(2);
    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();

    {
        let mut guard = bm.fetch_page_write(&tree, pid).unwrap();
        copy_string(guard.as_mut_slice(), "page0updated");
    }
    {
        let guard = bm.fetch_page_read(&tree, pid).unwrap();
        assert_eq!(read_string(guard.as_slice()), "page0updated");
    }

    assert_eq!(bm.pinned_slot_count(), 0);
    let snapshot = bm.stats().snapshot();
    assert_eq!(snapshot.pins, 2);
    assert_eq!(snapshot.unpins, 2);
}

#[test]
fn test_guards_hold_slots() {
    let bm = create_bm(2);
    let tree = bm.create_btree().unwrap();
    let pids: Vec<PageId> = (0..3).map(|_| bm.allocate_page(&tree).unwrap()).collect();

    let g0 = bm.fetch_page_read(&tree, pids[0]).unwrap();
    let g1 = bm.fetch_page_write(&tree, pids[1]).unwrap();
    assert_eq!(
        bm.fetch_page_read(&tree, pids[2]).unwrap_err().kind(),
        ErrorKind::BufferFull
    );

    // Dropping the guard unpins, but the page stays resident.
    drop(g0);
    assert_eq!(bm.pinned_slot_count(), 1);
    assert_eq!(
        bm.fetch_page_read(&tree, pids[2]).unwrap_err().kind(),
        ErrorKind::BufferFull
    );

    drop(g1);
    bm.close_btree(&tree).unwrap();
    let g2 = bm.fetch_page_read(&tree, pids[2]).unwrap();
    assert_eq!(g2.page_id(), pids[2]);
}

#[test]
fn test_dirty_unpin_with_live_write_lock() {
    let bm = create_bm(SLOTS);
    let tree = bm.create_btree().unwrap();
    let pid = bm.allocate_page(&tree).unwrap();
    let pinned = bm.pin_page(&tree, pid).unwrap();

    let mut page = pinned.write();
    copy_string(page.as_mut_slice(), "locked");
    assert_eq!(
        bm.unpin_page(pinned.slot(), true).unwrap_err().kind(),
        ErrorKind::Conflict
    );

    // The manager lock was released: other calls proceed.
    let other = bm.create_btree().unwrap();
    assert!(bm.open_btree(&other).is_ok());

    drop(page);
    bm.unpin_page(pinned.slot(), true).unwrap();
    assert_eq!(read_string(&bm.read_page(&tree, pid).unwrap()), "locked");
}
