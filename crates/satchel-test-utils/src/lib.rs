//! Test utilities and fixtures for Satchel development.
//!
//! Provides a standard type table ([`fixtures`]), a
//! [`RecordingConsumer`] implementation of [`CommandConsumer`], and
//! request builders for engine tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use satchel_arena::ItemArena;
use satchel_core::{
    Command, CommandConsumer, CommandType, Handle, ItemRequest, ItemType, Receipt, RequestOutcome,
    RequestPayload, TickId,
};

pub use fixtures::*;

/// Records every batch handed to it.
#[derive(Debug, Default)]
pub struct RecordingConsumer {
    pub batches: Vec<(TickId, Vec<Command>)>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded command, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.batches.iter().flat_map(|(_, cmds)| cmds.iter())
    }

    /// Command types of every recorded command, oldest first.
    pub fn kinds(&self) -> Vec<CommandType> {
        self.all().map(|c| c.command_type).collect()
    }
}

impl CommandConsumer for RecordingConsumer {
    fn consume(&mut self, tick: TickId, commands: &[Command]) {
        self.batches.push((tick, commands.to_vec()));
    }
}

/// Panic with the violation if the arena's tables disagree.
pub fn assert_invariants(arena: &ItemArena) {
    if let Err(e) = arena.check_invariants() {
        panic!("arena invariant violated: {e}");
    }
}

/// Command types currently in the arena's unflushed log.
pub fn command_kinds(arena: &ItemArena) -> Vec<CommandType> {
    arena.commands().iter().map(|c| c.command_type).collect()
}

// ── Request builders ────────────────────────────────────────────

pub fn add_root(item_type: ItemType, count: u32) -> ItemRequest {
    ItemRequest::new(RequestPayload::AddRoot { item_type, count })
}

pub fn add(parent: Handle, slot: u32, item_type: ItemType, count: u32) -> ItemRequest {
    ItemRequest::new(RequestPayload::Add {
        parent,
        slot,
        item_type,
        count,
    })
}

pub fn move_item(handle: Handle, parent: Handle, slot: u32) -> ItemRequest {
    ItemRequest::new(RequestPayload::MoveItem {
        handle,
        parent,
        slot,
    })
}

pub fn remove(handle: Handle, count: u32) -> ItemRequest {
    ItemRequest::new(RequestPayload::Remove { handle, count })
}

/// The handle a placement or spawn receipt produced.
///
/// Panics on any other outcome.
pub fn produced_handle(receipt: &Receipt) -> Handle {
    match receipt.outcome {
        Some(RequestOutcome::Placed(p)) => p.handle,
        Some(RequestOutcome::Spawned(h)) => h,
        ref other => panic!("receipt produced no handle: {other:?}"),
    }
}
