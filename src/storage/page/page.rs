//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array. Page tables own the committed copy of
//! every page; buffer slots hold private working copies.

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB), zero-filled on creation.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code: copying 4KB should
/// be explicit, via [`Page::copy_from`] or [`Page::boxed_copy`]. A
/// `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use btree_store::storage::page::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a new zeroed page on the heap.
    pub fn new_boxed() -> Box<Self> {
        Box::new(Self::new())
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this page with the contents of `other`.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Heap copy of this page.
    pub fn boxed_copy(&self) -> Box<Page> {
        let mut page = Self::new_boxed();
        page.copy_from(self);
        page
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        f.debug_struct("Page").field("used_prefix", &used).finish()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page
    }
}

// ============================================================================
// TESTS
// ============================================================================
