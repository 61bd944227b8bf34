//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A plain index into the [`crate::StringInterner`]. Equality and hashing
/// are O(1) integer operations; the text is recovered through the interner.
///
/// `Name::EMPTY` (index 0) doubles as the "absent" sentinel for optional
/// name slots (no alias, no loop label, no rest binding).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as usize.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check whether this is a real (non-empty) name.
    #[inline]
    pub const fn is_present(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_absent() {
        assert!(!Name::EMPTY.is_present());
        assert!(Name::from_raw(1).is_present());
        assert_eq!(Name::default(), Name::EMPTY);
    }

    #[test]
    fn name_ordering() {
        assert!(Name::from_raw(1) < Name::from_raw(2));
    }
}
