//! Buffer slot identifier type.

use std::fmt;

/// Identifies a slot (position) in the buffer pool.
///
/// Slots are stored in a `Vec`, so the id is a plain `usize` index:
/// `slots[slot_id.0]`.
///
/// # Example
/// ```
/// use btree_store::SlotId;
///
/// let slot = SlotId::new(5);
/// assert_eq!(slot.index(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Create a new SlotId.
    #[inline]
    pub fn new(id: usize) -> Self {
        SlotId(id)
    }

    /// Position in the pool.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}
