//! Arena-specific error types.
//!
//! Operation failures are [`satchel_core::ItemError`]; the types here cover
//! type table construction and structural self-checks.

use std::error::Error;
use std::fmt;

use satchel_core::{Handle, ItemType};

/// Errors building a [`TypeTable`](crate::TypeTable) from definitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeTableError {
    /// No type definitions were supplied.
    Empty,
    /// A filter list names a type that is not defined.
    UnknownFilterType {
        /// The type whose filter list is bad.
        owner: ItemType,
        /// The undefined type it names.
        referenced: ItemType,
    },
    /// A fungible list names a type that is not defined.
    UnknownFungibleType {
        /// The type whose fungible list is bad.
        owner: ItemType,
        /// The undefined type it names.
        referenced: ItemType,
    },
}

impl fmt::Display for TypeTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "type table has no definitions"),
            Self::UnknownFilterType { owner, referenced } => {
                write!(f, "type {owner} filters on undefined type {referenced}")
            }
            Self::UnknownFungibleType { owner, referenced } => {
                write!(
                    f,
                    "type {owner} lists undefined type {referenced} as fungible"
                )
            }
        }
    }
}

impl Error for TypeTableError {}

/// A structural invariant found broken by
/// [`ItemArena::check_invariants`](crate::ItemArena::check_invariants).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantError {
    /// A child entry points at a dead handle.
    DanglingChild {
        /// Index of the parent holding the entry.
        parent_index: u32,
        /// Slot of the entry.
        slot: u32,
    },
    /// A child entry and the child's parent link disagree.
    ParentMismatch {
        /// The child item.
        handle: Handle,
    },
    /// An item's count exceeds the stack cap of its type.
    CountOutOfRange {
        /// The item.
        handle: Handle,
        /// Its current count.
        count: u32,
    },
    /// An item occupies a slot at or above its parent's capacity.
    SlotOutOfRange {
        /// The item.
        handle: Handle,
        /// The slot it claims.
        slot: u32,
    },
    /// Following sibling links from an item loops.
    SiblingCycle {
        /// An item on the loop.
        handle: Handle,
    },
    /// An item's parent link is dead.
    DanglingParent {
        /// The orphaned item.
        handle: Handle,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingChild { parent_index, slot } => {
                write!(f, "child entry {parent_index}[{slot}] points at a dead item")
            }
            Self::ParentMismatch { handle } => {
                write!(f, "{handle} disagrees with its parent's child entry")
            }
            Self::CountOutOfRange { handle, count } => {
                write!(f, "{handle} has out-of-range count {count}")
            }
            Self::SlotOutOfRange { handle, slot } => {
                write!(f, "{handle} occupies slot {slot} beyond parent capacity")
            }
            Self::SiblingCycle { handle } => {
                write!(f, "sibling chain through {handle} loops")
            }
            Self::DanglingParent { handle } => {
                write!(f, "{handle} has a dead parent")
            }
        }
    }
}

impl Error for InvariantError {}
