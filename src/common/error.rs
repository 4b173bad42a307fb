//! Error types for the B-tree store.

use thiserror::Error;

use super::{BTreeId, PageId, SlotId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors returned by the buffer manager and index stores.
///
/// Nothing is retried internally: every error is handed back to the caller
/// synchronously. Use [`Error::kind`] to match on the broad category.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the operating system.
    ///
    /// Raised when a range scan cannot spawn its producer thread, and by
    /// page tables backed by real files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The handle is not registered with the manager.
    #[error("btree not found: {0}")]
    TreeNotFound(BTreeId),

    /// The page id is not present in the handle's page table.
    #[error("page not found: {page_id} in {btree}")]
    PageNotFound { btree: BTreeId, page_id: PageId },

    /// The slot position holds no page.
    #[error("page not found: {0} is empty")]
    SlotEmpty(SlotId),

    /// Every slot in the pool is pinned.
    #[error("buffer is full: all {capacity} slots are pinned")]
    BufferFull { capacity: usize },

    /// Close attempted while the handle still has pinned slots.
    #[error("cannot close {0}: pages still pinned")]
    PagesStillPinned(BTreeId),

    /// Unpin attempted on a slot that is not pinned.
    #[error("page at {0} is not pinned")]
    SlotNotPinned(SlotId),

    /// Write-back needed the working copy while a caller held it for writing.
    #[error("page at {0} is locked for writing")]
    PageLocked(SlotId),
}

/// Broad error categories, independent of the identifiers involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TreeNotFound,
    PageNotFound,
    BufferFull,
    Conflict,
    Io,
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::TreeNotFound(_) => ErrorKind::TreeNotFound,
            Error::PageNotFound { .. } | Error::SlotEmpty(_) => ErrorKind::PageNotFound,
            Error::BufferFull { .. } => ErrorKind::BufferFull,
            Error::PagesStillPinned(_) | Error::SlotNotPinned(_) | Error::PageLocked(_) => {
                ErrorKind::Conflict
            }
        }
    }

    /// True for both "tree not found" and "page not found" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::TreeNotFound | ErrorKind::PageNotFound)
    }
}
