//! B-tree handle type.

use std::fmt;

/// Opaque handle naming one B-tree registered with a buffer manager.
///
/// The manager mints handles as `btree_1`, `btree_2`, ... and never reuses
/// one, even after the tree is deleted. Callers should treat the string as
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BTreeId(String);

impl BTreeId {
    const PREFIX: &'static str = "btree_";

    /// Handle for the `n`-th tree created by a manager.
    pub(crate) fn from_seq(n: u64) -> Self {
        BTreeId(format!("{}{}", Self::PREFIX, n))
    }

    /// The handle as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BTreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BTreeId {
    fn from(s: &str) -> Self {
        BTreeId(s.to_owned())
    }
}

impl From<String> for BTreeId {
    fn from(s: String) -> Self {
        BTreeId(s)
    }
}

impl AsRef<str> for BTreeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
