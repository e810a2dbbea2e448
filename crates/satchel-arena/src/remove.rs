//! Removal: counted removal with cascade, and type-filtered removal that
//! dissolves matching items while rescuing their contents.

use smallvec::SmallVec;

use satchel_core::{Handle, ItemError, ItemType};

use crate::arena::ItemArena;

/// State threaded through a type-filtered removal.
struct Drain<'q, 'o> {
    item_type: ItemType,
    parent_types: &'q [ItemType],
    remaining: u32,
    visited: Vec<bool>,
    out_siblings: &'o mut Vec<Handle>,
    out_children: &'o mut Vec<Handle>,
}

impl ItemArena {
    /// Remove `count` units from `handle`.
    ///
    /// A count of zero, or at least the item's count, destroys the item
    /// together with its contents and sibling chain; each destroyed item
    /// logs its own `Destroy`, contents first. Otherwise the count is
    /// reduced (`Remove`). Returns the units taken from `handle` itself.
    pub fn remove(&mut self, handle: Handle, count: u32) -> Result<u32, ItemError> {
        let held = self.live(handle)?.count;
        if count == 0 || count >= held {
            return Ok(self.destroy_cascade(handle));
        }
        self.take(handle, count);
        Ok(count)
    }

    /// Remove up to `count` units of `item_type` from the contents of
    /// `handle` and of its sibling chain.
    ///
    /// Items are visited child slot by child slot, each slot's sibling
    /// chain in order, descending into non-matching items. Fungible
    /// aliases of `item_type` match; a non-empty `parent_types` restricts
    /// matches to items whose container has one of those types.
    ///
    /// A matching item that is taken completely is dissolved rather than
    /// cascaded: its sibling link is cut (`Connect`, the old sibling is
    /// pushed to `out_siblings`), its children are detached to root
    /// (`Move` each, pushed to `out_children`), and only then is it
    /// destroyed. Returns the units removed.
    pub fn remove_matching(
        &mut self,
        handle: Handle,
        item_type: ItemType,
        count: u32,
        parent_types: &[ItemType],
        out_siblings: &mut Vec<Handle>,
        out_children: &mut Vec<Handle>,
    ) -> Result<u32, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        self.def(item_type)?;
        self.live(handle)?;

        let mut drain = Drain {
            item_type,
            parent_types,
            remaining: count,
            visited: vec![false; self.handles.slot_count()],
            out_siblings,
            out_children,
        };
        let containers: SmallVec<[Handle; 4]> =
            std::iter::once(handle).chain(self.sibling_chain(handle)).collect();
        for container in containers {
            if drain.remaining == 0 {
                break;
            }
            self.drain_contents(container, &mut drain);
        }
        let removed = count - drain.remaining;
        tracing::trace!(%handle, %item_type, removed, "removed matching units");
        Ok(removed)
    }

    fn drain_contents(&mut self, container: Handle, drain: &mut Drain<'_, '_>) {
        let Some(container_type) = self.handles.try_get(container).map(|i| i.item_type) else {
            return;
        };
        let slots: SmallVec<[Handle; 8]> = self
            .children
            .children(container.index)
            .iter()
            .map(|e| e.handle)
            .collect();
        for first in slots {
            let mut next = Some(first);
            let mut steps = self.handles.len();
            while let Some(item) = next {
                if drain.remaining == 0 || steps == 0 {
                    return;
                }
                steps -= 1;
                // Read the link before the item can be dissolved.
                next = self.handles.try_get(item).and_then(|i| i.sibling);
                self.drain_item(item, container_type, drain);
            }
        }
    }

    fn drain_item(&mut self, item: Handle, container_type: ItemType, drain: &mut Drain<'_, '_>) {
        let Some(info) = self.handles.try_get(item).copied() else {
            return;
        };
        let seen = &mut drain.visited[item.index as usize];
        if *seen {
            return;
        }
        *seen = true;

        let parent_ok =
            drain.parent_types.is_empty() || drain.parent_types.contains(&container_type);
        let matched = parent_ok
            && info.count > 0
            && self.types.filters().matches(drain.item_type, info.item_type);
        if !matched {
            self.drain_contents(item, drain);
            return;
        }

        let taken = drain.remaining.min(info.count);
        drain.remaining -= taken;
        if taken < info.count {
            self.take(item, taken);
            return;
        }
        if let Some(sibling) = info.sibling {
            self.link(item, None);
            drain.out_siblings.push(sibling);
        }
        let contents: SmallVec<[Handle; 8]> = self
            .children
            .children(item.index)
            .iter()
            .map(|e| e.handle)
            .collect();
        for child in contents {
            self.relocate(child, None);
            drain.out_children.push(child);
        }
        self.destroy_one(item);
    }
}
