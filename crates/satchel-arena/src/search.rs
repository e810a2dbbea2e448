//! Hierarchical queries: placement search, containment and counting.
//!
//! # Placement search
//!
//! [`ItemArena::find`] looks for where `count` units of a type should go
//! under a root. A *Normal* result is an existing item of that exact type
//! with room for all the units; an *Empty* result is a free slot in a
//! container whose filter admits the type. Normal beats Empty anywhere in
//! the traversal; among Empties the first one visited wins.
//!
//! Traversal order from the root:
//!
//! 1. The root's own free slots, then its direct children (Normal check),
//!    then each child as a container, descending at most
//!    [`ArenaConfig::search_depth`](crate::ArenaConfig) levels.
//! 2. Each item on the root's sibling chain, searched the same way but
//!    without following further sibling links.

use smallvec::SmallVec;

use satchel_core::{Found, FoundKind, Handle, ItemError, ItemType, SearchFlags};

use crate::arena::ItemArena;

/// A read-only walk over item contents with a running unit budget.
struct Tally<'q> {
    item_type: ItemType,
    parent_types: &'q [ItemType],
    /// Units still wanted; `None` counts without a limit.
    budget: Option<u64>,
    total: u64,
    visited: Vec<bool>,
}

impl Tally<'_> {
    fn satisfied(&self) -> bool {
        self.budget.is_some_and(|b| self.total >= b)
    }
}

impl ItemArena {
    /// Find where `count` units of `item_type` fit under `root`.
    ///
    /// Returns `Ok(None)` when nothing fits.
    ///
    /// # Errors
    ///
    /// [`ItemError::TypeOutOfRange`] for an unregistered type and
    /// [`ItemError::InvalidHandle`] for a dead root.
    pub fn find(
        &self,
        root: Handle,
        item_type: ItemType,
        count: u32,
        flags: SearchFlags,
    ) -> Result<Option<Found>, ItemError> {
        self.def(item_type)?;
        self.live(root)?;
        let depth = self.config.search_depth;
        let local = flags - SearchFlags::SIBLINGS;
        let mut best = None;

        if let Some(found) = self.find_in(root, item_type, count, local, depth, &mut best) {
            return Ok(Some(found));
        }
        if flags.contains(SearchFlags::SIBLINGS) {
            for sibling in self.sibling_chain(root) {
                if let Some(found) =
                    self.find_in(sibling, item_type, count, local, depth, &mut best)
                {
                    return Ok(Some(found));
                }
            }
        }
        Ok(best)
    }

    /// Search one node. Returns a Normal hit; records the first Empty.
    fn find_in(
        &self,
        node: Handle,
        item_type: ItemType,
        count: u32,
        flags: SearchFlags,
        depth: u32,
        best: &mut Option<Found>,
    ) -> Option<Found> {
        let info = self.handles.try_get(node)?;

        if flags.contains(SearchFlags::SELF)
            && best.is_none()
            && self.stack_cap(item_type) > 0
            && self.types.filters().accepts(info.item_type, item_type)
        {
            let capacity = self.slot_cap(info.item_type);
            if let Some(slot) = self.children.first_free_slot(node.index, capacity) {
                *best = Some(Found {
                    kind: FoundKind::Empty,
                    parent: node,
                    slot,
                });
            }
        }

        if !flags.contains(SearchFlags::CHILDREN) {
            return None;
        }
        let cap = u64::from(self.stack_cap(item_type));
        let entries = self.children.children(node.index);
        for entry in entries {
            let Some(child) = self.handles.try_get(entry.handle) else {
                continue;
            };
            if child.item_type == item_type && u64::from(child.count) + u64::from(count) <= cap {
                return Some(Found {
                    kind: FoundKind::Normal,
                    parent: node,
                    slot: entry.slot,
                });
            }
        }
        if depth > 0 {
            let nested = SearchFlags::SELF | SearchFlags::CHILDREN;
            for entry in entries {
                if let Some(found) =
                    self.find_in(entry.handle, item_type, count, nested, depth - 1, best)
                {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Whether at least `count` units of `item_type` sit under `handle`.
    ///
    /// Contents of `handle` and of every item on its sibling chain are
    /// searched, children before sibling chains. Fungible aliases of
    /// `item_type` count. A non-empty `parent_types` only counts items
    /// whose container has one of those types.
    pub fn contains(
        &self,
        handle: Handle,
        item_type: ItemType,
        count: u32,
        parent_types: &[ItemType],
    ) -> Result<bool, ItemError> {
        if count == 0 {
            self.live(handle)?;
            self.def(item_type)?;
            return Ok(true);
        }
        let total = self.tally(handle, item_type, parent_types, Some(u64::from(count)))?;
        Ok(total >= u64::from(count))
    }

    /// Total units of `item_type` (and its fungible aliases) under `handle`.
    ///
    /// Saturates at `u32::MAX`.
    pub fn count_of(
        &self,
        handle: Handle,
        item_type: ItemType,
        parent_types: &[ItemType],
    ) -> Result<u32, ItemError> {
        let total = self.tally(handle, item_type, parent_types, None)?;
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }

    /// The outermost container of `handle` (itself when it is a root).
    pub fn get_root(&self, handle: Handle) -> Result<Handle, ItemError> {
        let mut current = handle;
        let mut info = self.live(handle)?;
        while let Some(p) = info.parent {
            current = p.handle;
            info = self.live(current)?;
        }
        Ok(current)
    }

    fn tally(
        &self,
        handle: Handle,
        item_type: ItemType,
        parent_types: &[ItemType],
        budget: Option<u64>,
    ) -> Result<u64, ItemError> {
        self.def(item_type)?;
        self.live(handle)?;
        let mut walk = Tally {
            item_type,
            parent_types,
            budget,
            total: 0,
            visited: vec![false; self.handles.slot_count()],
        };
        let containers: SmallVec<[Handle; 4]> =
            std::iter::once(handle).chain(self.sibling_chain(handle)).collect();
        for container in containers {
            self.tally_contents(container, &mut walk);
            if walk.satisfied() {
                break;
            }
        }
        Ok(walk.total)
    }

    fn tally_contents(&self, container: Handle, walk: &mut Tally<'_>) {
        let Some(info) = self.handles.try_get(container) else {
            return;
        };
        let container_type = info.item_type;
        for entry in self.children.children(container.index) {
            let first = std::iter::once(entry.handle);
            for item in first.chain(self.sibling_chain(entry.handle)) {
                if walk.satisfied() {
                    return;
                }
                self.tally_item(item, container_type, walk);
            }
        }
    }

    fn tally_item(&self, item: Handle, container_type: ItemType, walk: &mut Tally<'_>) {
        let Some(info) = self.handles.try_get(item) else {
            return;
        };
        let seen = &mut walk.visited[item.index as usize];
        if *seen {
            return;
        }
        *seen = true;
        let parent_ok = walk.parent_types.is_empty() || walk.parent_types.contains(&container_type);
        if parent_ok && info.count > 0 && self.types.filters().matches(walk.item_type, info.item_type)
        {
            walk.total += u64::from(info.count);
        }
        self.tally_contents(item, walk);
    }
}
