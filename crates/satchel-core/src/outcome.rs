//! Result types shared by arena operations and engine receipts.

use std::ops::{BitOr, BitOrAssign, Sub};

use crate::id::{Handle, ItemType};
use crate::item::Info;

/// Where units ended up after an add-family operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The item now holding the placed units.
    pub handle: Handle,
    /// Requested units that did not fit.
    pub leftover: u32,
}

/// How a whole-item move resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveType {
    /// Part of the source stack merged into the destination; the source survives.
    Normal,
    /// The source stack was fully absorbed by the destination and destroyed.
    Reverse,
    /// The item was relocated, or swapped places with the occupant.
    All,
}

/// Result of a type exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchanged {
    /// The reissued handle (same index, version + 1).
    pub handle: Handle,
    /// The type the item had before the exchange.
    pub previous_type: ItemType,
    /// The updated record.
    pub info: Info,
}

/// Which parts of the tree a search may look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchFlags(u8);

impl SearchFlags {
    /// No scope.
    pub const NONE: SearchFlags = SearchFlags(0);
    /// Free slots of the searched item itself.
    pub const SELF: SearchFlags = SearchFlags(1);
    /// Items chained through the sibling link.
    pub const SIBLINGS: SearchFlags = SearchFlags(1 << 1);
    /// Existing child stacks, and below them up to the depth limit.
    pub const CHILDREN: SearchFlags = SearchFlags(1 << 2);
    /// `SELF | SIBLINGS | CHILDREN`.
    pub const ALL: SearchFlags = SearchFlags(0b111);

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: SearchFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SearchFlags {
    type Output = SearchFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        SearchFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SearchFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Sub for SearchFlags {
    type Output = SearchFlags;

    fn sub(self, rhs: Self) -> Self::Output {
        SearchFlags(self.0 & !rhs.0)
    }
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Whether a search topped up an existing stack or found a free slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoundKind {
    /// An existing same-type stack with room for the units.
    Normal,
    /// An unoccupied slot.
    Empty,
}

/// An insertion point located by a tree search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Found {
    /// Whether the slot is occupied by a compatible stack.
    pub kind: FoundKind,
    /// The container.
    pub parent: Handle,
    /// The slot within the container.
    pub slot: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_arithmetic() {
        let f = SearchFlags::SELF | SearchFlags::CHILDREN;
        assert!(f.contains(SearchFlags::SELF));
        assert!(!f.contains(SearchFlags::SIBLINGS));
        assert_eq!(SearchFlags::ALL - SearchFlags::SIBLINGS, f);
        assert_eq!(SearchFlags::default(), SearchFlags::ALL);
        assert!(SearchFlags::ALL.contains(SearchFlags::NONE));
    }
}
