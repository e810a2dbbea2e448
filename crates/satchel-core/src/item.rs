//! Arena payload records: [`Info`], [`Parent`] and [`ChildEntry`].

use crate::id::{Handle, ItemType};

/// Where an attached item sits: its container and the slot inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Parent {
    /// The containing item.
    pub handle: Handle,
    /// Child slot within the container, `< types[container].capacity`.
    pub slot: u32,
}

impl Parent {
    /// Build a parent reference.
    pub const fn new(handle: Handle, slot: u32) -> Self {
        Self { handle, slot }
    }
}

/// The record stored for every live item.
///
/// `parent` is `None` exactly when the item is a root. An attached item
/// always has a matching entry in the child index of its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Info {
    /// Version of the slot this record lives in.
    pub version: u32,
    /// Registered item type.
    pub item_type: ItemType,
    /// Stack count, within `[0, types[item_type].count]`.
    pub count: u32,
    /// Container and slot, `None` for roots.
    pub parent: Option<Parent>,
    /// Next item in this item's overflow chain.
    pub sibling: Option<Handle>,
}

impl Info {
    /// A fresh root record.
    pub fn root(version: u32, item_type: ItemType, count: u32) -> Self {
        Self {
            version,
            item_type,
            count,
            parent: None,
            sibling: None,
        }
    }

    /// Whether the item has no container.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The container handle, or [`Handle::EMPTY`] for roots.
    pub fn parent_handle(&self) -> Handle {
        self.parent.map_or(Handle::EMPTY, |p| p.handle)
    }

    /// The slot inside the container, or `-1` for roots.
    pub fn parent_child_index(&self) -> i64 {
        self.parent.map_or(-1, |p| i64::from(p.slot))
    }

    /// The sibling handle, or [`Handle::EMPTY`] when unchained.
    pub fn sibling_handle(&self) -> Handle {
        self.sibling.unwrap_or(Handle::EMPTY)
    }
}

/// One occupied child slot of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildEntry {
    /// Slot number within the container.
    pub slot: u32,
    /// The item occupying the slot.
    pub handle: Handle,
}
