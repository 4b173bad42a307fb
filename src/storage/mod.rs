//! Storage layer - pages and per-tree page tables.
//!
//! - [`page`] - The 4KB page type
//! - [`PageTable`] - Committed pages of one B-tree, keyed by page id

pub mod page;
mod page_table;

pub use page_table::PageTable;
