//! The item arena: handle table, child index, type table and command log.
//!
//! [`ItemArena`] owns every [`Info`] record. Queries live in
//! [`search`](crate::search); mutations are split across the `add`,
//! `moves`, `remove` and `link` modules as further `impl ItemArena`
//! blocks. Every mutation validates fully before touching state, so a
//! returned `Err` means nothing changed and nothing was logged.

use std::sync::Arc;

use indexmap::IndexSet;

use satchel_core::{
    ChildEntry, Command, Handle, Info, ItemError, ItemReader, ItemType, Parent, TypeDef,
};

use crate::child_index::ChildIndex;
use crate::config::ArenaConfig;
use crate::error::{InvariantError, TypeTableError};
use crate::handle_table::HandleTable;
use crate::log::CommandLog;
use crate::type_table::TypeTable;

/// Generational item arena with containment and a command log.
#[derive(Clone, Debug)]
pub struct ItemArena {
    pub(crate) handles: HandleTable,
    pub(crate) children: ChildIndex,
    pub(crate) types: TypeTable,
    pub(crate) log: CommandLog,
    pub(crate) config: ArenaConfig,
}

// Compile-time assertion: the arena can be shared behind a lock.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ItemArena>();
};

impl ItemArena {
    /// Create an empty arena over a validated type table.
    pub fn new(types: TypeTable, config: ArenaConfig) -> Self {
        let mut children = ChildIndex::new();
        children.reserve(config.initial_items / 4);
        Self {
            handles: HandleTable::with_capacity(config.initial_items),
            children,
            types,
            log: CommandLog::new(),
            config,
        }
    }

    /// Build the type table from `defs` and create an empty arena.
    pub fn from_defs(defs: Vec<TypeDef>, config: ArenaConfig) -> Result<Self, TypeTableError> {
        Ok(Self::new(TypeTable::new(defs)?, config))
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The record behind `handle`, if live.
    pub fn try_get(&self, handle: Handle) -> Option<&Info> {
        self.handles.try_get(handle)
    }

    /// Occupied child slots of `handle`, ordered by slot.
    pub fn get_children(&self, handle: Handle) -> Result<&[ChildEntry], ItemError> {
        self.live(handle)?;
        Ok(self.children.children(handle.index))
    }

    /// The registered types.
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// The arena's configuration.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no item is live.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterate over live items in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Info)> {
        self.handles.iter()
    }

    // ── Command log ─────────────────────────────────────────────

    /// Commands recorded since the last flush.
    pub fn commands(&self) -> &[Command] {
        self.log.current()
    }

    /// Commands published by the last flush.
    pub fn old_commands(&self) -> Arc<[Command]> {
        self.log.old_commands()
    }

    /// Pre-size the command buffer for an upcoming batch.
    pub fn reserve_commands(&mut self, additional: usize) {
        self.log.reserve(additional);
    }

    /// Publish this tick's commands as the old commands.
    pub fn flush(&mut self) -> usize {
        self.log.flush()
    }

    /// Destroy every item without logging and drop both log buffers.
    ///
    /// Slot versions survive, so handles issued before the clear stay
    /// stale afterwards.
    pub fn clear(&mut self) {
        let dropped = self.handles.len();
        self.handles.clear();
        self.children.clear();
        self.log.clear();
        tracing::debug!(dropped, "arena cleared");
    }

    // ── Validation helpers ──────────────────────────────────────

    pub(crate) fn live(&self, handle: Handle) -> Result<&Info, ItemError> {
        self.handles
            .try_get(handle)
            .ok_or(ItemError::InvalidHandle { handle })
    }

    pub(crate) fn def(&self, item_type: ItemType) -> Result<&TypeDef, ItemError> {
        self.types
            .get(item_type)
            .ok_or(ItemError::TypeOutOfRange { item_type })
    }

    pub(crate) fn stack_cap(&self, item_type: ItemType) -> u32 {
        self.types.get(item_type).map_or(0, |d| d.count)
    }

    pub(crate) fn slot_cap(&self, item_type: ItemType) -> u32 {
        self.types.get(item_type).map_or(0, |d| d.capacity)
    }

    /// Validate `parent` and `slot`, returning the parent's record.
    pub(crate) fn slot_of(&self, parent: Handle, slot: u32) -> Result<&Info, ItemError> {
        let info = self.live(parent)?;
        let capacity = self.slot_cap(info.item_type);
        if slot >= capacity {
            return Err(ItemError::SlotOutOfRange { slot, capacity });
        }
        Ok(info)
    }

    pub(crate) fn check_filter(
        &self,
        parent_type: ItemType,
        child_type: ItemType,
    ) -> Result<(), ItemError> {
        if self.types.filters().accepts(parent_type, child_type) {
            Ok(())
        } else {
            Err(ItemError::FilterRejected {
                parent_type,
                child_type,
            })
        }
    }

    /// The item in `slot` of the live container `parent`.
    pub(crate) fn occupant(&self, parent: Handle, slot: u32) -> Option<Handle> {
        self.children.find(parent.index, slot).map(|e| e.handle)
    }

    /// Whether `node` is `ancestor` or lies somewhere inside it.
    pub(crate) fn is_within(&self, node: Handle, ancestor: Handle) -> bool {
        let mut current = node;
        for _ in 0..=self.handles.len() {
            if current == ancestor {
                return true;
            }
            match self.handles.try_get(current).and_then(|i| i.parent) {
                Some(p) => current = p.handle,
                None => return false,
            }
        }
        false
    }

    /// Live items chained after `handle`, stopping at a dead link.
    pub(crate) fn sibling_chain(&self, handle: Handle) -> SiblingChain<'_> {
        SiblingChain {
            arena: self,
            next: self.handles.try_get(handle).and_then(|i| i.sibling),
            remaining: self.handles.len(),
        }
    }

    // ── Primitive mutations (each logs exactly one command) ─────

    /// Create a new item and log `Create`.
    pub(crate) fn spawn(
        &mut self,
        item_type: ItemType,
        count: u32,
        parent: Option<Parent>,
        source: Handle,
    ) -> Handle {
        let index = self.handles.next_free_index();
        let version = self.handles.next_version(index);
        let info = Info {
            version,
            item_type,
            count,
            parent,
            sibling: None,
        };
        let handle = Handle::new(index, version);
        self.handles.insert(index, info);
        if let Some(p) = parent {
            let added = self.children.add(p.handle.index, ChildEntry { slot: p.slot, handle });
            debug_assert!(added, "spawn into occupied slot {p:?}");
        }
        self.log.push(Command::create(handle, &info, source));
        handle
    }

    /// Add `units` to a live item and log `Add`.
    pub(crate) fn top_up(&mut self, handle: Handle, units: u32, source: Handle) {
        if let Some(info) = self.handles.try_get_mut(handle) {
            let before = info.count;
            info.count += units;
            let cmd = Command::add(handle, info, before, source);
            self.log.push(cmd);
        }
    }

    /// Take `units` from a live item (leaving at least one) and log `Remove`.
    pub(crate) fn take(&mut self, handle: Handle, units: u32) {
        if let Some(info) = self.handles.try_get_mut(handle) {
            debug_assert!(units < info.count, "take would empty {handle}");
            let before = info.count;
            info.count -= units;
            let cmd = Command::remove(handle, info, before);
            self.log.push(cmd);
        }
    }

    /// Re-parent a live item (or make it a root) and log `Move`.
    ///
    /// The destination slot must be free.
    pub(crate) fn relocate(&mut self, handle: Handle, parent: Option<Parent>) {
        let Some(previous) = self.handles.try_get(handle).map(|i| i.parent) else {
            return;
        };
        if let Some(old) = previous {
            self.children.remove(old.handle.index, old.slot);
        }
        if let Some(new) = parent {
            let added = self.children.add(new.handle.index, ChildEntry { slot: new.slot, handle });
            debug_assert!(added, "relocate into occupied slot {new:?}");
        }
        if let Some(info) = self.handles.try_get_mut(handle) {
            info.parent = parent;
            let cmd = Command::moved(handle, info, previous);
            self.log.push(cmd);
        }
    }

    /// Set a live item's sibling link and log `Connect`.
    pub(crate) fn link(&mut self, handle: Handle, sibling: Option<Handle>) -> Option<Handle> {
        let info = self.handles.try_get_mut(handle)?;
        let previous = info.sibling;
        info.sibling = sibling;
        let cmd = Command::connect(handle, info, previous);
        self.log.push(cmd);
        previous
    }

    /// Remove one item and log `Destroy`, without touching its contents.
    pub(crate) fn destroy_one(&mut self, handle: Handle) -> u32 {
        let Some(info) = self.handles.try_get(handle).copied() else {
            return 0;
        };
        if let Some(p) = info.parent {
            if self.children.find(p.handle.index, p.slot).map(|e| e.handle) == Some(handle) {
                self.children.remove(p.handle.index, p.slot);
            }
        }
        self.children.remove_parent(handle.index);
        self.handles.remove(handle.index);
        self.log.push(Command::destroy(handle, &info));
        info.count
    }

    /// Destroy `handle`, its contents and its sibling chain.
    ///
    /// Children go first, depth-first, then each chained sibling (with its
    /// own contents), then the node itself. Returns the units the node
    /// itself held.
    pub(crate) fn destroy_cascade(&mut self, handle: Handle) -> u32 {
        self.destroy_collected(handle, true)
    }

    /// Destroy `handle` and its contents, leaving its sibling chain alone.
    pub(crate) fn destroy_subtree(&mut self, handle: Handle) -> u32 {
        self.destroy_collected(handle, false)
    }

    fn destroy_collected(&mut self, handle: Handle, chain: bool) -> u32 {
        let mut order = IndexSet::new();
        let mut seen = IndexSet::new();
        self.collect_cascade(handle, chain, &mut seen, &mut order);
        tracing::trace!(%handle, destroyed = order.len(), "cascading destroy");
        let mut units = 0;
        for h in order {
            let n = self.destroy_one(h);
            if h == handle {
                units = n;
            }
        }
        units
    }

    fn collect_cascade(
        &self,
        handle: Handle,
        chain: bool,
        seen: &mut IndexSet<Handle>,
        order: &mut IndexSet<Handle>,
    ) {
        if !seen.insert(handle) || self.handles.try_get(handle).is_none() {
            return;
        }
        for entry in self.children.children(handle.index) {
            self.collect_cascade(entry.handle, true, seen, order);
        }
        if chain {
            let siblings: Vec<Handle> = self.sibling_chain(handle).collect();
            for sibling in siblings {
                // A chain looping back to a container still being collected
                // must not log that container before its contents.
                if self.encloses_pending(sibling, seen, order) {
                    continue;
                }
                self.collect_cascade(sibling, true, seen, order);
            }
        }
        order.insert(handle);
    }

    /// Whether `node` is, or contains, an item entered but not yet ordered.
    fn encloses_pending(
        &self,
        node: Handle,
        seen: &IndexSet<Handle>,
        order: &IndexSet<Handle>,
    ) -> bool {
        seen.iter()
            .filter(|h| !order.contains(*h))
            .any(|&pending| self.is_within(pending, node))
    }

    // ── Self-check ──────────────────────────────────────────────

    /// Verify the structural invariants tying the tables together.
    ///
    /// Every attached item has exactly one matching child entry and every
    /// entry points back at a live item claiming it; counts stay within
    /// their type's stack cap; slots stay within their parent's capacity;
    /// sibling chains terminate.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (handle, info) in self.handles.iter() {
            if info.count > self.stack_cap(info.item_type) {
                return Err(InvariantError::CountOutOfRange {
                    handle,
                    count: info.count,
                });
            }
            if let Some(p) = info.parent {
                let Some(parent) = self.handles.try_get(p.handle) else {
                    return Err(InvariantError::DanglingParent { handle });
                };
                if p.slot >= self.slot_cap(parent.item_type) {
                    return Err(InvariantError::SlotOutOfRange {
                        handle,
                        slot: p.slot,
                    });
                }
                if self.children.find(p.handle.index, p.slot).map(|e| e.handle) != Some(handle) {
                    return Err(InvariantError::ParentMismatch { handle });
                }
            }
            let mut steps = 0;
            let mut next = info.sibling;
            while let Some(s) = next {
                if steps > self.handles.len() || s == handle {
                    return Err(InvariantError::SiblingCycle { handle });
                }
                next = self.handles.try_get(s).and_then(|i| i.sibling);
                steps += 1;
            }
        }
        for (parent_index, entry) in self.children.iter() {
            let Some(info) = self.handles.try_get(entry.handle) else {
                return Err(InvariantError::DanglingChild {
                    parent_index,
                    slot: entry.slot,
                });
            };
            match info.parent {
                Some(p) if p.handle.index == parent_index && p.slot == entry.slot => {}
                _ => {
                    return Err(InvariantError::ParentMismatch {
                        handle: entry.handle,
                    })
                }
            }
        }
        Ok(())
    }
}

impl ItemReader for ItemArena {
    fn try_get(&self, handle: Handle) -> Option<&Info> {
        self.handles.try_get(handle)
    }

    fn children(&self, handle: Handle) -> &[ChildEntry] {
        if self.handles.try_get(handle).is_some() {
            self.children.children(handle.index)
        } else {
            &[]
        }
    }

    fn type_def(&self, item_type: ItemType) -> Option<&TypeDef> {
        self.types.get(item_type)
    }
}

/// Iterator over a sibling chain; see [`ItemArena::sibling_chain`].
pub(crate) struct SiblingChain<'a> {
    arena: &'a ItemArena,
    next: Option<Handle>,
    remaining: usize,
}

impl Iterator for SiblingChain<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let current = self.next?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let info = self.arena.handles.try_get(current)?;
        self.next = info.sibling;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::CommandType;

    fn arena() -> ItemArena {
        ItemArena::from_defs(
            vec![TypeDef::container(1, 3), TypeDef::stack(10)],
            ArenaConfig::default(),
        )
        .unwrap()
    }

    const BAG: ItemType = ItemType(0);
    const COIN: ItemType = ItemType(1);

    #[test]
    fn spawn_logs_create_and_links_parent() {
        let mut a = arena();
        let bag = a.spawn(BAG, 1, None, Handle::EMPTY);
        let coin = a.spawn(COIN, 4, Some(Parent::new(bag, 2)), Handle::EMPTY);
        assert_eq!(a.len(), 2);
        assert_eq!(a.occupant(bag, 2), Some(coin));
        assert_eq!(a.commands().len(), 2);
        assert!(a.commands().iter().all(|c| c.command_type == CommandType::Create));
        a.check_invariants().unwrap();
    }

    #[test]
    fn cascade_destroys_children_first() {
        let mut a = arena();
        let bag = a.spawn(BAG, 1, None, Handle::EMPTY);
        let inner = a.spawn(BAG, 1, Some(Parent::new(bag, 0)), Handle::EMPTY);
        let coin = a.spawn(COIN, 4, Some(Parent::new(inner, 0)), Handle::EMPTY);
        a.flush();
        assert_eq!(a.destroy_cascade(bag), 1);
        let order: Vec<Handle> = a.commands().iter().map(|c| c.destination).collect();
        assert_eq!(order, vec![coin, inner, bag]);
        assert!(a.is_empty());
        assert!(a.children.is_empty());
    }

    #[test]
    fn cascade_skips_chain_back_into_ancestor() {
        let mut a = arena();
        let outer = a.spawn(BAG, 1, None, Handle::EMPTY);
        let inner = a.spawn(BAG, 1, Some(Parent::new(outer, 0)), Handle::EMPTY);
        let coin = a.spawn(COIN, 4, Some(Parent::new(inner, 0)), Handle::EMPTY);
        a.link(coin, Some(outer));
        a.flush();

        assert_eq!(a.destroy_cascade(inner), 1);
        let order: Vec<Handle> = a.commands().iter().map(|c| c.destination).collect();
        assert_eq!(order, vec![coin, inner]);
        assert!(a.try_get(outer).is_some());
        a.check_invariants().unwrap();
    }

    #[test]
    fn cascade_from_top_keeps_children_first_with_looping_chain() {
        let mut a = arena();
        let outer = a.spawn(BAG, 1, None, Handle::EMPTY);
        let inner = a.spawn(BAG, 1, Some(Parent::new(outer, 0)), Handle::EMPTY);
        let coin = a.spawn(COIN, 4, Some(Parent::new(inner, 0)), Handle::EMPTY);
        a.link(coin, Some(outer));
        a.flush();

        a.destroy_cascade(outer);
        let order: Vec<Handle> = a.commands().iter().map(|c| c.destination).collect();
        assert_eq!(order, vec![coin, inner, outer]);
        assert!(a.is_empty());
    }

    #[test]
    fn cascade_follows_sibling_chain() {
        let mut a = arena();
        let first = a.spawn(COIN, 10, None, Handle::EMPTY);
        let second = a.spawn(COIN, 3, None, Handle::EMPTY);
        a.link(first, Some(second));
        a.flush();
        assert_eq!(a.destroy_cascade(first), 10);
        assert!(a.is_empty());
        assert_eq!(a.commands().len(), 2);
        assert_eq!(a.commands()[0].destination, second);
    }

    #[test]
    fn is_within_walks_ancestors() {
        let mut a = arena();
        let bag = a.spawn(BAG, 1, None, Handle::EMPTY);
        let inner = a.spawn(BAG, 1, Some(Parent::new(bag, 0)), Handle::EMPTY);
        let other = a.spawn(BAG, 1, None, Handle::EMPTY);
        assert!(a.is_within(inner, bag));
        assert!(a.is_within(bag, bag));
        assert!(!a.is_within(bag, inner));
        assert!(!a.is_within(other, bag));
    }

    #[test]
    fn check_invariants_detects_mismatch() {
        let mut a = arena();
        let bag = a.spawn(BAG, 1, None, Handle::EMPTY);
        let coin = a.spawn(COIN, 1, Some(Parent::new(bag, 0)), Handle::EMPTY);
        a.children.remove(bag.index, 0);
        assert_eq!(
            a.check_invariants(),
            Err(InvariantError::ParentMismatch { handle: coin })
        );
    }

    #[test]
    fn clear_keeps_old_handles_stale() {
        let mut a = arena();
        let bag = a.spawn(BAG, 1, None, Handle::EMPTY);
        a.clear();
        assert!(a.try_get(bag).is_none());
        assert!(a.commands().is_empty());
        let again = a.spawn(BAG, 1, None, Handle::EMPTY);
        assert_eq!(again.index, bag.index);
        assert!(again.version > bag.version);
    }
}
