//! Command log records and the consumer-side event view.
//!
//! Every committed structural mutation of the arena appends one or more
//! [`Command`] records. Records are immutable once written and ordered:
//! consumers scan forward and must treat a [`CommandType::Destroy`]
//! immediately followed by a [`CommandType::Create`] on the same handle
//! index as a single type rename. [`events()`] performs that coalescing.

use crate::id::{Handle, ItemType};
use crate::item::{Info, Parent};

/// Kind of structural mutation recorded by a [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// A new item was created.
    Create,
    /// Units were added to an existing stack.
    Add,
    /// A sibling link was set or cleared.
    Connect,
    /// An item changed container (or was detached to root).
    Move,
    /// Units were taken from a stack that survives.
    Remove,
    /// An item was deleted.
    Destroy,
}

/// Immutable record of one committed mutation.
///
/// Field usage per kind:
///
/// | kind | `source` | `destination` | counts |
/// |------|----------|---------------|--------|
/// | `Create` | origin of the units or empty | new item | `count`, `destination_count` = created units |
/// | `Add` | origin of the units or empty | topped-up item | `count` = delta, before/after in `source_count`/`destination_count` |
/// | `Remove` | empty | reduced item | `count` = delta, before/after |
/// | `Destroy` | empty | deleted item | `count` = units at deletion |
/// | `Connect` | empty | relinked item | siblings in `source_sibling`/`destination_sibling` |
/// | `Move` | empty | moved item | parents in `source_parent`/`destination_parent` |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    /// What happened.
    pub command_type: CommandType,
    /// Type of the item the command is about.
    pub item_type: ItemType,
    /// Units involved in the change.
    pub count: u32,
    /// Count of the destination item before the change.
    pub source_count: u32,
    /// Count of the destination item after the change.
    pub destination_count: u32,
    /// Container before the change.
    pub source_parent: Option<Parent>,
    /// Container after the change.
    pub destination_parent: Option<Parent>,
    /// Sibling link before the change.
    pub source_sibling: Option<Handle>,
    /// Sibling link after the change.
    pub destination_sibling: Option<Handle>,
    /// Item the units came from, if any.
    pub source: Handle,
    /// Item the command is about.
    pub destination: Handle,
}

impl Command {
    fn blank(command_type: CommandType, item_type: ItemType, destination: Handle) -> Self {
        Self {
            command_type,
            item_type,
            count: 0,
            source_count: 0,
            destination_count: 0,
            source_parent: None,
            destination_parent: None,
            source_sibling: None,
            destination_sibling: None,
            source: Handle::EMPTY,
            destination,
        }
    }

    /// A new item `destination` holding `info.count` units.
    pub fn create(destination: Handle, info: &Info, source: Handle) -> Self {
        Self {
            count: info.count,
            destination_count: info.count,
            destination_parent: info.parent,
            destination_sibling: info.sibling,
            source,
            ..Self::blank(CommandType::Create, info.item_type, destination)
        }
    }

    /// `delta` units added to `destination`, whose count went `before -> before + delta`.
    pub fn add(destination: Handle, info: &Info, before: u32, source: Handle) -> Self {
        Self {
            count: info.count - before,
            source_count: before,
            destination_count: info.count,
            source_parent: info.parent,
            destination_parent: info.parent,
            source,
            ..Self::blank(CommandType::Add, info.item_type, destination)
        }
    }

    /// Units taken from `destination`, whose count went `before -> info.count`.
    pub fn remove(destination: Handle, info: &Info, before: u32) -> Self {
        Self {
            count: before - info.count,
            source_count: before,
            destination_count: info.count,
            source_parent: info.parent,
            destination_parent: info.parent,
            ..Self::blank(CommandType::Remove, info.item_type, destination)
        }
    }

    /// `destination` was deleted; `info` is its last state.
    pub fn destroy(destination: Handle, info: &Info) -> Self {
        Self {
            count: info.count,
            source_count: info.count,
            source_parent: info.parent,
            source_sibling: info.sibling,
            ..Self::blank(CommandType::Destroy, info.item_type, destination)
        }
    }

    /// The sibling link of `destination` changed from `previous` to `info.sibling`.
    pub fn connect(destination: Handle, info: &Info, previous: Option<Handle>) -> Self {
        Self {
            count: info.count,
            source_count: info.count,
            destination_count: info.count,
            source_parent: info.parent,
            destination_parent: info.parent,
            source_sibling: previous,
            destination_sibling: info.sibling,
            ..Self::blank(CommandType::Connect, info.item_type, destination)
        }
    }

    /// `destination` moved from `previous` to `info.parent`.
    pub fn moved(destination: Handle, info: &Info, previous: Option<Parent>) -> Self {
        Self {
            count: info.count,
            source_count: info.count,
            destination_count: info.count,
            source_parent: previous,
            destination_parent: info.parent,
            source_sibling: info.sibling,
            destination_sibling: info.sibling,
            ..Self::blank(CommandType::Move, info.item_type, destination)
        }
    }
}

/// A consumer-level view of the command log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandEvent<'a> {
    /// A single mutation.
    Single(&'a Command),
    /// A Destroy/Create pair on one index: the item changed type in place.
    Renamed {
        /// The Destroy record (old handle and type).
        destroyed: &'a Command,
        /// The Create record (new handle and type).
        created: &'a Command,
    },
}

/// Iterate `commands` as [`CommandEvent`]s, folding type-exchange pairs.
///
/// A pair is folded only when the Create immediately follows the Destroy,
/// both name the same handle index with a newer version on the Create, and
/// the Create names the destroyed handle as its source. An unrelated item
/// that merely reuses the freed index is reported as a plain Create.
pub fn events(commands: &[Command]) -> Events<'_> {
    Events { commands, pos: 0 }
}

/// Iterator returned by [`events()`].
pub struct Events<'a> {
    commands: &'a [Command],
    pos: usize,
}

impl<'a> Iterator for Events<'a> {
    type Item = CommandEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.commands.get(self.pos)?;
        if current.command_type == CommandType::Destroy {
            if let Some(next) = self.commands.get(self.pos + 1) {
                if next.command_type == CommandType::Create
                    && next.destination.index == current.destination.index
                    && next.destination.version > current.destination.version
                    && next.source == current.destination
                {
                    self.pos += 2;
                    return Some(CommandEvent::Renamed {
                        destroyed: current,
                        created: next,
                    });
                }
            }
        }
        self.pos += 1;
        Some(CommandEvent::Single(current))
    }
}
