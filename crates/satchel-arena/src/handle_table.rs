//! Generational slot table mapping [`Handle`]s to [`Info`] records.
//!
//! Each slot remembers the last version it issued even while vacant, so a
//! slot that is freed and reissued always hands out a strictly newer
//! version. A lookup succeeds only when the handle's version matches the
//! slot's current version and the slot is occupied.

use std::collections::BTreeSet;

use satchel_core::{Handle, Info, ItemType};

/// Index reserved as an overflow guard; never issued.
pub const RESERVED_INDEX: u32 = u32::MAX;

#[derive(Clone, Debug, Default)]
struct Slot {
    version: u32,
    info: Option<Info>,
}

/// Generational index table.
#[derive(Clone, Debug, Default)]
pub struct HandleTable {
    slots: Vec<Slot>,
    /// Vacant indices below `slots.len()`, lowest handed out first.
    free: BTreeSet<u32>,
    live: usize,
}

impl HandleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: BTreeSet::new(),
            live: 0,
        }
    }

    /// The record behind `handle`, if the handle is live.
    pub fn try_get(&self, handle: Handle) -> Option<&Info> {
        if handle.is_empty() {
            return None;
        }
        let slot = self.slots.get(handle.index as usize)?;
        let info = slot.info.as_ref()?;
        (slot.version == handle.version).then_some(info)
    }

    /// Mutable access to the record behind a live `handle`.
    pub fn try_get_mut(&mut self, handle: Handle) -> Option<&mut Info> {
        if handle.is_empty() {
            return None;
        }
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.version != handle.version {
            return None;
        }
        slot.info.as_mut()
    }

    /// The live handle currently stored at `index`, if any.
    pub fn handle_at(&self, index: u32) -> Option<Handle> {
        let slot = self.slots.get(index as usize)?;
        slot.info.as_ref().map(|_| Handle::new(index, slot.version))
    }

    /// Lowest index usable for a new item.
    ///
    /// # Panics
    ///
    /// Panics if the table would have to issue [`RESERVED_INDEX`].
    pub fn next_free_index(&self) -> u32 {
        let index = match self.free.first() {
            Some(&i) => i,
            None => u32::try_from(self.slots.len()).unwrap_or(RESERVED_INDEX),
        };
        assert!(index != RESERVED_INDEX, "handle table index space exhausted");
        index
    }

    /// Version the next item created at `index` will carry.
    ///
    /// Always greater than anything previously issued at that index;
    /// 0 is skipped on wrap-around.
    pub fn next_version(&self, index: u32) -> u32 {
        let previous = self.slots.get(index as usize).map_or(0, |s| s.version);
        match previous.wrapping_add(1) {
            0 => 1,
            v => v,
        }
    }

    /// Issue a handle for a new root record of `item_type`.
    pub fn allocate(&mut self, item_type: ItemType, count: u32) -> Handle {
        let index = self.next_free_index();
        let version = self.next_version(index);
        self.insert(index, Info::root(version, item_type, count));
        Handle::new(index, version)
    }

    /// Write `info` at `index`, overwriting any occupant.
    ///
    /// The slot takes `info.version` as its current version. The caller is
    /// responsible for obtaining `index` and the version from this table.
    pub fn insert(&mut self, index: u32, info: Info) {
        let i = index as usize;
        if i >= self.slots.len() {
            for gap in self.slots.len()..i {
                // Gap indices fit in u32 because `index` does.
                self.free.insert(gap as u32);
            }
            self.slots.resize_with(i + 1, Slot::default);
        }
        self.free.remove(&index);
        let slot = &mut self.slots[i];
        debug_assert!(
            info.version > slot.version || slot.info.is_some(),
            "reissued index {index} must carry a newer version"
        );
        if slot.info.is_none() {
            self.live += 1;
        }
        slot.version = info.version;
        slot.info = Some(info);
    }

    /// Vacate `index`, making it eligible for reuse.
    ///
    /// Returns `false` if the slot was already vacant.
    pub fn remove(&mut self, index: u32) -> bool {
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return false;
        };
        if slot.info.take().is_none() {
            return false;
        }
        self.free.insert(index);
        self.live -= 1;
        true
    }

    /// Reissue the live record at `index` under a newer version.
    ///
    /// Every handle issued before becomes stale. Returns the new handle.
    pub fn bump_version(&mut self, index: u32) -> Option<Handle> {
        let version = self.next_version(index);
        let slot = self.slots.get_mut(index as usize)?;
        let info = slot.info.as_mut()?;
        info.version = version;
        slot.version = version;
        Some(Handle::new(index, version))
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no record is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever used (live or vacant).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Reserve room for `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Iterate over live records in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Info)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.info
                .as_ref()
                .map(|info| (Handle::new(i as u32, slot.version), info))
        })
    }

    /// Vacate every slot, keeping versions so old handles stay stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.info.take().is_some() {
                self.free.insert(i as u32);
            }
        }
        self.live = 0;
    }
}
