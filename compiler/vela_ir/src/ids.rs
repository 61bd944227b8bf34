//! Typed indices and ranges for the flat IR arenas.
//!
//! Every node family gets a u32 newtype index with an `INVALID` sentinel
//! (used for optional children: no else branch, no default expression).
//! Ranges are `(start: u32, len: u16)` windows into flattened side lists.

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Invalid sentinel (absent optional child).
            pub const INVALID: $name = $name(u32::MAX);

            /// Create a new id.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Check if this is a valid id.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

macro_rules! define_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(C)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            /// Empty range.
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            /// Create a new range.
            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                $name { start, len }
            }

            /// Check if the range is empty.
            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            /// Number of elements.
            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            /// Iterator over flat-list indices in this range.
            #[inline]
            pub fn indices(&self) -> impl Iterator<Item = usize> {
                let start = self.start as usize;
                start..start + self.len as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}..{})"),
                    self.start,
                    self.start + u32::from(self.len)
                )
            }
        }
    };
}

define_id! {
    /// Index into the expression arena.
    ExprId
}
define_id! {
    /// Index into the statement arena.
    StmtId
}
define_id! {
    /// Index into the enhanced-expression block arena.
    BlockId
}
define_id! {
    /// Index into the binding-pattern arena.
    PatternId
}
define_id! {
    /// Index into the template-element arena.
    TemplateId
}
define_id! {
    /// Index into the component table.
    ComponentId
}
define_id! {
    /// Index into the function table.
    FunctionId
}
define_id! {
    /// Identity of a resolved binding (assigned by the binding resolver).
    BindingId
}
define_id! {
    /// Identity of an underlying reactive cell (a `SignalDescriptor` row).
    SignalId
}

define_range! {
    /// Range of expressions in the flattened expression list.
    ExprRange
}
define_range! {
    /// Range of statements in the flattened statement list.
    StmtRange
}
define_range! {
    /// Range of object-literal properties.
    PropRange
}
define_range! {
    /// Range of object-pattern entries.
    PatEntryRange
}
define_range! {
    /// Range of template attributes.
    AttrRange
}
define_range! {
    /// Range of template children.
    ChildRange
}
define_range! {
    /// Range of component prop specs.
    PropSpecRange
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_validity() {
        let id = ExprId::new(42);
        assert!(id.is_valid());
        assert_eq!(id.index(), 42);
        assert!(!ExprId::INVALID.is_valid());
        assert!(!BlockId::default().is_valid());
    }

    #[test]
    fn id_debug() {
        assert_eq!(format!("{:?}", StmtId::new(3)), "StmtId(3)");
        assert_eq!(format!("{:?}", StmtId::INVALID), "StmtId::INVALID");
    }

    #[test]
    fn range_iteration() {
        let range = ExprRange::new(10, 3);
        assert_eq!(range.len(), 3);
        let indices: Vec<_> = range.indices().collect();
        assert_eq!(indices, vec![10, 11, 12]);
    }

    #[test]
    fn empty_range() {
        assert!(StmtRange::EMPTY.is_empty());
        assert_eq!(StmtRange::default(), StmtRange::EMPTY);
        assert_eq!(StmtRange::EMPTY.indices().count(), 0);
    }

    #[test]
    fn id_size() {
        assert_eq!(std::mem::size_of::<ExprId>(), 4);
        assert_eq!(std::mem::size_of::<ExprRange>(), 8);
    }
}
