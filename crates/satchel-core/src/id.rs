//! Strongly-typed identifiers: item handles, item types, and ticks.

use smallvec::SmallVec;
use std::fmt;

/// Versioned reference to an item slot in the arena.
///
/// A handle is live only while the arena slot at `index` stores the same
/// `version`. Versions at an index strictly increase every time the slot is
/// reissued, so a handle kept across a removal can never observe the item
/// that later reuses its index.
///
/// [`Handle::EMPTY`] (`{0, 0}`) is the universal null value. Version 0 is
/// never assigned to a live item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle {
    /// Slot index in the handle table.
    pub index: u32,
    /// Generation of the slot when this handle was issued.
    pub version: u32,
}

impl Handle {
    /// The null handle. Never refers to a live item.
    pub const EMPTY: Handle = Handle {
        index: 0,
        version: 0,
    };

    /// Build a handle from raw parts.
    pub const fn new(index: u32, version: u32) -> Self {
        Self { index, version }
    }

    /// Whether this is [`Handle::EMPTY`].
    pub const fn is_empty(&self) -> bool {
        self.index == 0 && self.version == 0
    }

    /// `None` for [`Handle::EMPTY`], `Some(self)` otherwise.
    pub fn non_empty(self) -> Option<Handle> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Handle(empty)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.version)
        }
    }
}

/// Identifies a registered item type.
///
/// Types are registered once from configuration and assigned sequential
/// IDs: `ItemType(n)` is the n-th entry of the type definition list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemType(pub u32);

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemType {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the command log is flushed by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A small set of item types, used for parent-type restrictions and
/// filter lists. Inline for up to four entries.
pub type TypeList = SmallVec<[ItemType; 4]>;
