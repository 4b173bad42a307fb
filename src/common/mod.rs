//! Common types and utilities shared across the crate.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration
//! - Error types
//! - Identifiers (BTreeId, PageId, SlotId)

mod btree_id;
pub mod config;
pub mod error;
mod page_id;
mod slot_id;

pub use btree_id::BTreeId;
pub use config::{BufferManagerConfig, DEFAULT_BUFFER_SIZE, PAGE_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use page_id::PageId;
pub use slot_id::SlotId;
