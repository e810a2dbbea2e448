//! Error types for the Satchel item arena.
//!
//! Organized by subsystem: arena operations ([`ItemError`]), the request
//! ingress pipeline ([`IngressError`]), and read/write phase gating
//! ([`PhaseError`]). Every arena failure is reported in-band; a failed
//! operation leaves the arena and the command log untouched.

use std::error::Error;
use std::fmt;

use crate::id::{Handle, ItemType};

/// Errors from arena queries and mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemError {
    /// The handle is stale, empty, or its index was never issued.
    InvalidHandle {
        /// The offending handle.
        handle: Handle,
    },
    /// The type ID is not registered in the type table.
    TypeOutOfRange {
        /// The unregistered type.
        item_type: ItemType,
    },
    /// The slot number is not below the container's slot capacity.
    SlotOutOfRange {
        /// The requested slot.
        slot: u32,
        /// Slot capacity of the container type.
        capacity: u32,
    },
    /// No stack or slot capacity is left for the requested units.
    CapacityExceeded {
        /// Units that could not be placed.
        requested: u32,
        /// Units the destination could still take.
        available: u32,
    },
    /// The container type does not accept the child type.
    FilterRejected {
        /// Type of the container.
        parent_type: ItemType,
        /// Type of the refused item.
        child_type: ItemType,
    },
    /// The slot already holds an item of a different type.
    SlotOccupied {
        /// The occupant.
        occupant: Handle,
    },
    /// A zero unit count was requested where units are required.
    ZeroCount,
    /// The item has no container to detach from.
    NotAttached {
        /// The root item.
        handle: Handle,
    },
    /// Linking would make the sibling chain loop back on itself.
    SiblingCycle {
        /// The item whose link was being set.
        handle: Handle,
    },
    /// The move would place an item inside itself or one of its descendants.
    ContainmentCycle {
        /// The item being moved.
        handle: Handle,
    },
    /// The exchange target type equals the current type.
    SameType {
        /// The unchanged type.
        item_type: ItemType,
    },
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHandle { handle } => write!(f, "invalid handle: {handle}"),
            Self::TypeOutOfRange { item_type } => {
                write!(f, "item type {item_type} is not registered")
            }
            Self::SlotOutOfRange { slot, capacity } => {
                write!(f, "slot {slot} out of range (capacity {capacity})")
            }
            Self::CapacityExceeded {
                requested,
                available,
            } => write!(
                f,
                "capacity exceeded: requested {requested} units, {available} available"
            ),
            Self::FilterRejected {
                parent_type,
                child_type,
            } => write!(f, "type {parent_type} does not accept type {child_type}"),
            Self::SlotOccupied { occupant } => write!(f, "slot occupied by {occupant}"),
            Self::ZeroCount => write!(f, "zero unit count"),
            Self::NotAttached { handle } => write!(f, "{handle} has no parent"),
            Self::SiblingCycle { handle } => {
                write!(f, "sibling link on {handle} would form a cycle")
            }
            Self::ContainmentCycle { handle } => {
                write!(f, "{handle} cannot be placed inside itself")
            }
            Self::SameType { item_type } => write!(f, "item already has type {item_type}"),
        }
    }
}

impl Error for ItemError {}

/// Reasons a queued request was not applied.
///
/// Used in [`Receipt::reason_code`](crate::request::Receipt) to explain
/// why a request was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngressError {
    /// The request queue is at capacity.
    QueueFull,
    /// The engine end of the intent channel is gone.
    Disconnected,
    /// The arena refused the operation.
    Rejected(ItemError),
}

impl fmt::Display for IngressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "request queue full"),
            Self::Disconnected => write!(f, "intent channel disconnected"),
            Self::Rejected(e) => write!(f, "request rejected: {e}"),
        }
    }
}

impl Error for IngressError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            Self::QueueFull | Self::Disconnected => None,
        }
    }
}

/// Errors from the read/write phase gate.
///
/// Acquisition never waits: a conflicting phase is reported so the caller
/// can order itself after the outstanding ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseError {
    /// A writer holds the arena; readers must wait for the write phase.
    WriterActive {
        /// Phase number of the outstanding writer.
        phase: u64,
    },
    /// Readers hold the arena; the writer must wait for them to finish.
    ReadersActive {
        /// Phase number of the newest outstanding reader.
        phase: u64,
    },
    /// A ticket holder panicked; the arena may be inconsistent.
    Poisoned,
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriterActive { phase } => write!(f, "writer active in phase {phase}"),
            Self::ReadersActive { phase } => write!(f, "readers active in phase {phase}"),
            Self::Poisoned => write!(f, "arena lock poisoned"),
        }
    }
}

impl Error for PhaseError {}
