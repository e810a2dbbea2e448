//! Parent → occupied-slot multimap.
//!
//! [`ChildIndex`] is keyed by the parent's arena index, not its handle, so
//! a parent whose version is bumped in place keeps its children. Each
//! parent's list is kept sorted by slot number: traversal order is the
//! slot order, which keeps searches deterministic.

use indexmap::IndexMap;
use smallvec::SmallVec;

use satchel_core::{ChildEntry, Handle};

/// Occupied slots of a single parent, sorted by slot.
pub type ChildList = SmallVec<[ChildEntry; 4]>;

/// Multimap from parent index to its occupied child slots.
#[derive(Clone, Debug, Default)]
pub struct ChildIndex {
    map: IndexMap<u32, ChildList>,
    entries: usize,
}

impl ChildIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry` under `parent_index`.
    ///
    /// Returns `false` (and changes nothing) if the slot is already taken.
    pub fn add(&mut self, parent_index: u32, entry: ChildEntry) -> bool {
        let list = self.map.entry(parent_index).or_default();
        match list.binary_search_by_key(&entry.slot, |e| e.slot) {
            Ok(_) => false,
            Err(pos) => {
                list.insert(pos, entry);
                self.entries += 1;
                true
            }
        }
    }

    /// Drop the entry for `slot` under `parent_index`.
    pub fn remove(&mut self, parent_index: u32, slot: u32) -> Option<ChildEntry> {
        let list = self.map.get_mut(&parent_index)?;
        let pos = list.binary_search_by_key(&slot, |e| e.slot).ok()?;
        let entry = list.remove(pos);
        if list.is_empty() {
            self.map.swap_remove(&parent_index);
        }
        self.entries -= 1;
        Some(entry)
    }

    /// Drop every entry under `parent_index`, returning them.
    pub fn remove_parent(&mut self, parent_index: u32) -> ChildList {
        let list = self.map.swap_remove(&parent_index).unwrap_or_default();
        self.entries -= list.len();
        list
    }

    /// The entry for `slot` under `parent_index`.
    pub fn find(&self, parent_index: u32, slot: u32) -> Option<&ChildEntry> {
        let list = self.map.get(&parent_index)?;
        list.iter().find(|e| e.slot == slot)
    }

    /// Point the entry for `slot` at a reissued handle.
    pub fn replace(&mut self, parent_index: u32, slot: u32, handle: Handle) -> bool {
        let Some(list) = self.map.get_mut(&parent_index) else {
            return false;
        };
        match list.iter_mut().find(|e| e.slot == slot) {
            Some(entry) => {
                entry.handle = handle;
                true
            }
            None => false,
        }
    }

    /// Occupied slots of `parent_index`, sorted by slot.
    pub fn children(&self, parent_index: u32) -> &[ChildEntry] {
        self.map.get(&parent_index).map_or(&[], |l| l.as_slice())
    }

    /// Whether `parent_index` has any occupied slot.
    pub fn has_children(&self, parent_index: u32) -> bool {
        self.map.contains_key(&parent_index)
    }

    /// Lowest slot below `capacity` with no entry.
    pub fn first_free_slot(&self, parent_index: u32, capacity: u32) -> Option<u32> {
        let mut candidate = 0u32;
        for entry in self.children(parent_index) {
            if entry.slot != candidate {
                break;
            }
            candidate += 1;
        }
        (candidate < capacity).then_some(candidate)
    }

    /// Total number of entries across all parents.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Reserve room for `additional` more parents.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Iterate over `(parent_index, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ChildEntry)> {
        self.map
            .iter()
            .flat_map(|(&parent, list)| list.iter().map(move |e| (parent, e)))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slot: u32, index: u32) -> ChildEntry {
        ChildEntry {
            slot,
            handle: Handle::new(index, 1),
        }
    }

    #[test]
    fn children_sorted_by_slot() {
        let mut idx = ChildIndex::new();
        assert!(idx.add(7, entry(2, 10)));
        assert!(idx.add(7, entry(0, 11)));
        assert!(idx.add(7, entry(1, 12)));
        let slots: Vec<u32> = idx.children(7).iter().map(|e| e.slot).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn duplicate_slot_rejected() {
        let mut idx = ChildIndex::new();
        assert!(idx.add(1, entry(0, 5)));
        assert!(!idx.add(1, entry(0, 6)));
        assert_eq!(idx.find(1, 0).unwrap().handle.index, 5);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn remove_last_child_drops_parent() {
        let mut idx = ChildIndex::new();
        idx.add(1, entry(3, 5));
        assert_eq!(idx.remove(1, 3).unwrap().handle.index, 5);
        assert!(!idx.has_children(1));
        assert!(idx.remove(1, 3).is_none());
        assert!(idx.is_empty());
    }

    #[test]
    fn remove_parent_drops_all_entries() {
        let mut idx = ChildIndex::new();
        idx.add(1, entry(0, 5));
        idx.add(1, entry(1, 6));
        idx.add(2, entry(0, 7));
        assert_eq!(idx.remove_parent(1).len(), 2);
        assert_eq!(idx.len(), 1);
        assert!(idx.remove_parent(1).is_empty());
    }

    #[test]
    fn first_free_slot_finds_gaps() {
        let mut idx = ChildIndex::new();
        assert_eq!(idx.first_free_slot(1, 3), Some(0));
        assert_eq!(idx.first_free_slot(1, 0), None);
        idx.add(1, entry(0, 5));
        idx.add(1, entry(2, 6));
        assert_eq!(idx.first_free_slot(1, 3), Some(1));
        idx.add(1, entry(1, 7));
        assert_eq!(idx.first_free_slot(1, 3), None);
        assert_eq!(idx.first_free_slot(1, 4), Some(3));
    }

    #[test]
    fn replace_repoints_entry() {
        let mut idx = ChildIndex::new();
        idx.add(1, entry(0, 5));
        assert!(idx.replace(1, 0, Handle::new(5, 2)));
        assert_eq!(idx.find(1, 0).unwrap().handle, Handle::new(5, 2));
        assert!(!idx.replace(1, 9, Handle::new(5, 2)));
    }
}
