//! Queued arena requests and the receipts returned for them.
//!
//! Gameplay systems that run in parallel do not touch the arena directly:
//! they submit [`ItemRequest`]s, which the engine applies in one serialized
//! write phase per tick in a deterministic order.

use crate::error::IngressError;
use crate::id::{Handle, ItemType, TickId, TypeList};
use crate::outcome::{Exchanged, MoveType, Placement, SearchFlags};

/// A request submitted to the engine.
///
/// Requests are ordered by `priority_class` (lower = earlier), then by
/// `source_id`, then by `source_seq`, then by `arrival_seq`.
///
/// # Examples
///
/// ```
/// use satchel_core::{ItemRequest, ItemType, RequestPayload};
///
/// let req = ItemRequest::new(RequestPayload::AddRoot {
///     item_type: ItemType(2),
///     count: 10,
/// })
/// .from_source(7, 0);
///
/// assert_eq!(req.source_id, Some(7));
/// assert_eq!(req.priority_class, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRequest {
    /// The operation to perform.
    pub payload: RequestPayload,
    /// Optional source identifier (e.g. a worker or entity) for ordering.
    pub source_id: Option<u64>,
    /// Optional per-source sequence number.
    pub source_seq: Option<u64>,
    /// Priority class. Lower values run first; 0 = system, 1 = gameplay default.
    pub priority_class: u8,
    /// Monotonic arrival sequence number, set by the ingress queue.
    pub arrival_seq: u64,
}

impl ItemRequest {
    /// A default-priority anonymous request.
    pub fn new(payload: RequestPayload) -> Self {
        Self {
            payload,
            source_id: None,
            source_seq: None,
            priority_class: 1,
            arrival_seq: 0,
        }
    }

    /// Tag the request with its source and per-source sequence number.
    pub fn from_source(mut self, source_id: u64, source_seq: u64) -> Self {
        self.source_id = Some(source_id);
        self.source_seq = Some(source_seq);
        self
    }

    /// Override the priority class.
    pub fn with_priority(mut self, priority_class: u8) -> Self {
        self.priority_class = priority_class;
        self
    }
}

/// All request payloads, one per public arena mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestPayload {
    /// Create a new root stack.
    AddRoot {
        /// Type of the new item.
        item_type: ItemType,
        /// Units requested.
        count: u32,
    },
    /// Add units into a specific container slot.
    Add {
        /// The container.
        parent: Handle,
        /// Slot within the container.
        slot: u32,
        /// Type of the units.
        item_type: ItemType,
        /// Units requested.
        count: u32,
    },
    /// Search `root` for an insertion point, then add there.
    Place {
        /// Root of the searched tree.
        root: Handle,
        /// Type of the units.
        item_type: ItemType,
        /// Units requested.
        count: u32,
        /// Search scope.
        flags: SearchFlags,
    },
    /// Move some units of a stack into a slot.
    MoveCount {
        /// Source stack.
        handle: Handle,
        /// Destination container.
        parent: Handle,
        /// Destination slot.
        slot: u32,
        /// Units to move.
        count: u32,
    },
    /// Move, merge or swap a whole item into a slot.
    MoveItem {
        /// The item to move.
        handle: Handle,
        /// Destination container.
        parent: Handle,
        /// Destination slot.
        slot: u32,
    },
    /// Split half of a stack into a free slot of its container (or `into`).
    Split {
        /// The stack to split.
        handle: Handle,
        /// Alternative container for the new half.
        into: Option<Handle>,
    },
    /// Remove units from a stack, destroying it when emptied.
    Remove {
        /// The stack.
        handle: Handle,
        /// Units to remove; 0 removes the whole item.
        count: u32,
    },
    /// Remove units of a type from anywhere below `handle`.
    RemoveMatching {
        /// Root of the searched tree.
        handle: Handle,
        /// Type to remove.
        item_type: ItemType,
        /// Units to remove.
        count: u32,
        /// Only take from containers of these types (empty = any).
        parent_types: TypeList,
    },
    /// Set (or clear, with [`Handle::EMPTY`]) the sibling link.
    AttachSibling {
        /// The item to relink.
        handle: Handle,
        /// New sibling.
        sibling: Handle,
    },
    /// Detach an item from its container.
    DetachParent {
        /// The item.
        handle: Handle,
    },
    /// Detach `count` units of a stack as a new root.
    DetachCount {
        /// The stack.
        handle: Handle,
        /// Units to detach.
        count: u32,
    },
    /// Change an item's type in place.
    Exchange {
        /// The item.
        handle: Handle,
        /// New type.
        item_type: ItemType,
    },
}

/// What an applied request produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Units were placed.
    Placed(Placement),
    /// A whole item moved.
    Moved(MoveType),
    /// Units were removed.
    Removed(u32),
    /// A new item was split or detached off.
    Spawned(Handle),
    /// A link or parent relation changed.
    Relinked,
    /// The item changed type.
    Exchanged(Exchanged),
}

/// Where a request entered the engine.
///
/// Each origin has its own index space: a [`Receipt::request_index`] is a
/// position in the submitted batch for [`Submitted`](Self::Submitted)
/// requests and a position among the intents taken that tick for
/// [`Intent`](Self::Intent) requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RequestOrigin {
    /// Submitted directly as part of a batch.
    #[default]
    Submitted,
    /// Sent through an intent channel.
    Intent,
}

/// Receipt returned for each request in a submitted batch.
///
/// # Examples
///
/// ```
/// use satchel_core::{Receipt, RequestOrigin, TickId};
///
/// let receipt = Receipt {
///     accepted: true,
///     applied_tick_id: Some(TickId(5)),
///     reason_code: None,
///     request_index: 0,
///     origin: RequestOrigin::Submitted,
///     outcome: None,
/// };
///
/// assert!(receipt.accepted);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Whether the request was accepted and applied.
    pub accepted: bool,
    /// The tick in which the request was applied, if any.
    pub applied_tick_id: Option<TickId>,
    /// Why the request was rejected, if it was.
    pub reason_code: Option<IngressError>,
    /// Index of the request within its batch (see [`RequestOrigin`]).
    pub request_index: usize,
    /// Which index space `request_index` belongs to.
    pub origin: RequestOrigin,
    /// Result of the applied operation.
    pub outcome: Option<RequestOutcome>,
}

impl Receipt {
    /// An accepted, not yet applied receipt.
    pub fn queued(request_index: usize) -> Self {
        Self {
            accepted: true,
            applied_tick_id: None,
            reason_code: None,
            request_index,
            origin: RequestOrigin::Submitted,
            outcome: None,
        }
    }

    /// A rejected receipt.
    pub fn rejected(request_index: usize, reason: IngressError) -> Self {
        Self {
            accepted: false,
            applied_tick_id: None,
            reason_code: Some(reason),
            request_index,
            origin: RequestOrigin::Submitted,
            outcome: None,
        }
    }

    /// The same receipt attributed to `origin`.
    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }
}
