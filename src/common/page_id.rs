//! Page identifier type.

use std::fmt;

/// Identifies a page within one B-tree's page table.
///
/// Page ids are handed out per tree, densely and monotonically starting at
/// [`PageId::FIRST`]. A freed id is never handed out again, so `0` is free to
/// serve as the sentinel.
///
/// # Example
/// ```
/// use btree_store::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Invalid/sentinel page ID. Never allocated.
    pub const INVALID: PageId = PageId(0);

    /// First id allocated in every fresh page table.
    pub const FIRST: PageId = PageId(1);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u64) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// The id allocated after this one.
    #[inline]
    pub(crate) fn next(self) -> PageId {
        PageId(self.0 + 1)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
