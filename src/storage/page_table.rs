//! Page table - the committed pages of one B-tree.
//!
//! The [`PageTable`] plays the role a disk file plays in a persistent
//! engine: it is the home location of every page, and buffer slots copy
//! pages in from it and write them back to it.

use std::collections::HashMap;

use crate::common::{BTreeId, Error, PageId, Result};
use crate::storage::page::Page;

/// Pages belonging to one B-tree, keyed by page id.
///
/// # Layout
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ PageTable (btree_3)         next_page_id = 5 │
/// │  Page(1) → [4KB]                             │
/// │  Page(2) → [4KB]    Page(3) freed, never     │
/// │  Page(4) → [4KB]    handed out again         │
/// └──────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// `PageTable` is **single-threaded**. The `BufferManager` serializes access
/// to every page table behind its state mutex.
#[derive(Debug)]
pub struct PageTable {
    btree: BTreeId,
    pages: HashMap<PageId, Box<Page>>,
    /// Next id to hand out; only ever increases.
    next_page_id: PageId,
}

impl PageTable {
    /// Create an empty page table whose first allocation is `Page(1)`.
    pub fn new(btree: BTreeId) -> Self {
        Self {
            btree,
            pages: HashMap::new(),
            next_page_id: PageId::FIRST,
        }
    }

    /// Owning tree.
    #[inline]
    pub fn btree(&self) -> &BTreeId {
        &self.btree
    }

    /// Allocate a new zero-filled page and return its id.
    pub fn allocate_page(&mut self) -> PageId {
        let page_id = self.next_page_id;
        self.next_page_id = page_id.next();
        self.pages.insert(page_id, Page::new_boxed());
        page_id
    }

    /// Borrow the committed copy of a page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated or has
    /// been freed.
    pub fn read_page(&self, page_id: PageId) -> Result<&Page> {
        self.pages
            .get(&page_id)
            .map(|page| &**page)
            .ok_or_else(|| self.not_found(page_id))
    }

    /// Overwrite the committed copy of a page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page is not allocated.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        match self.pages.get_mut(&page_id) {
            Some(stored) => {
                stored.copy_from(page);
                Ok(())
            }
            None => Err(self.not_found(page_id)),
        }
    }

    /// Remove a page. Its id is not reused.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page is not allocated.
    pub fn free_page(&mut self, page_id: PageId) -> Result<()> {
        match self.pages.remove(&page_id) {
            Some(_) => Ok(()),
            None => Err(self.not_found(page_id)),
        }
    }

    /// Check if a page is allocated.
    #[inline]
    pub fn contains(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Number of allocated pages.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The id the next allocation will return.
    #[inline]
    pub fn next_page_id(&self) -> PageId {
        self.next_page_id
    }

    fn not_found(&self, page_id: PageId) -> Error {
        Error::PageNotFound {
            btree: self.btree.clone(),
            page_id,
        }
    }
}
