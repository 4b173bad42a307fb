//! Configuration for the buffer manager.

use std::path::{Path, PathBuf};

/// Size of a page in bytes (4KB).
///
/// Every page is allocated zero-filled at exactly this size.
pub const PAGE_SIZE: usize = 4096;

/// Number of buffer slots when no size is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 10;

/// Directory used when none is configured.
pub const DEFAULT_DIRECTORY: &str = ".";

/// Options recognised by [`BufferManager`](crate::buffer::BufferManager).
///
/// `directory` names where tree files would live. Pages are kept in memory
/// only, so nothing is ever written there; the value is stored and reported.
///
/// # Example
/// ```
/// use btree_store::BufferManagerConfig;
///
/// let config = BufferManagerConfig::default()
///     .with_directory("/var/lib/trees")
///     .with_buffer_size(64);
/// assert_eq!(config.buffer_size(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferManagerConfig {
    directory: PathBuf,
    buffer_size: usize,
}

impl BufferManagerConfig {
    /// Set the directory where B-tree files are stored.
    pub fn with_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.directory = dir.as_ref().to_path_buf();
        self
    }

    /// Set the number of slots in the buffer pool.
    ///
    /// Zero is accepted: every pin then fails with `BufferFull`.
    pub fn with_buffer_size(mut self, pages: usize) -> Self {
        self.buffer_size = pages;
        self
    }

    /// Configured directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Configured pool capacity in pages.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Default for BufferManagerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
