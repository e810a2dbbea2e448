//! Core abstraction traits for reading the arena and consuming its log.

use crate::command::Command;
use crate::id::{Handle, ItemType, TickId};
use crate::item::{ChildEntry, Info};
use crate::types::TypeDef;

/// Read-only access to item state.
///
/// Implemented by the arena and by its read-phase views so query code
/// (durability, UI sync, replication) does not depend on how the arena
/// is shared.
pub trait ItemReader {
    /// The record behind `handle`, if the handle is live.
    fn try_get(&self, handle: Handle) -> Option<&Info>;

    /// Occupied child slots of `handle`, ordered by slot number.
    ///
    /// Empty for stale handles and for items without children.
    fn children(&self, handle: Handle) -> &[ChildEntry];

    /// Definition of a registered type.
    fn type_def(&self, item_type: ItemType) -> Option<&TypeDef>;

    /// Whether `handle` refers to a live item.
    fn is_live(&self, handle: Handle) -> bool {
        self.try_get(handle).is_some()
    }
}

/// A downstream system fed with the previous tick's command log.
///
/// Consumers receive one-tick-stale commands: the list handed over at tick
/// `n` is everything committed during tick `n - 1`, complete and stable.
pub trait CommandConsumer {
    /// Process the commands committed during `tick`.
    fn consume(&mut self, tick: TickId, commands: &[Command]);
}
