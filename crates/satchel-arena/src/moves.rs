//! Moving units and items between slots: partial moves, whole-item moves
//! with merge and swap, splitting, and detaching to root.

use satchel_core::{ChildEntry, Command, Handle, ItemError, MoveType, Parent, Placement};

use crate::arena::ItemArena;

impl ItemArena {
    /// Move `count` units of `handle` into `slot` of `parent`.
    ///
    /// `count` is clamped to what the source holds. A same-type occupant
    /// absorbs as much as fits (`Remove` or `Destroy` on the source, then
    /// `Add`). An empty slot receives the whole item (`Move`) when every
    /// unit moves, otherwise a new split item (`Remove`, then `Create`).
    /// Units that could not move are reported as leftover and stay on the
    /// source.
    pub fn move_count(
        &mut self,
        handle: Handle,
        parent: Handle,
        slot: u32,
        count: u32,
    ) -> Result<Placement, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        let info = *self.live(handle)?;
        let parent_type = self.slot_of(parent, slot)?.item_type;
        self.check_filter(parent_type, info.item_type)?;
        let moving = count.min(info.count);

        match self.occupant(parent, slot) {
            Some(occupant) if occupant == handle => Err(ItemError::SlotOccupied { occupant }),
            Some(occupant) => {
                let target = *self.live(occupant)?;
                if target.item_type != info.item_type {
                    return Err(ItemError::SlotOccupied { occupant });
                }
                if self.is_within(occupant, handle) {
                    return Err(ItemError::ContainmentCycle { handle });
                }
                let room = self.stack_cap(target.item_type).saturating_sub(target.count);
                if room == 0 {
                    return Err(ItemError::CapacityExceeded {
                        requested: moving,
                        available: 0,
                    });
                }
                let merged = moving.min(room);
                if merged == info.count {
                    self.destroy_subtree(handle);
                } else {
                    self.take(handle, merged);
                }
                self.top_up(occupant, merged, handle);
                Ok(Placement {
                    handle: occupant,
                    leftover: count - merged,
                })
            }
            None if moving == info.count => {
                if self.is_within(parent, handle) {
                    return Err(ItemError::ContainmentCycle { handle });
                }
                self.relocate(handle, Some(Parent::new(parent, slot)));
                Ok(Placement {
                    handle,
                    leftover: count - moving,
                })
            }
            None => {
                self.take(handle, moving);
                let split = self.spawn(
                    info.item_type,
                    moving,
                    Some(Parent::new(parent, slot)),
                    handle,
                );
                Ok(Placement {
                    handle: split,
                    leftover: count - moving,
                })
            }
        }
    }

    /// Move the whole of `handle` into `slot` of `parent`.
    ///
    /// - empty slot: the item is relocated, [`MoveType::All`];
    /// - same-type occupant with room for everything: the source is
    ///   destroyed into it, [`MoveType::Reverse`] (its sibling chain is
    ///   left in place);
    /// - same-type occupant with partial room: it is topped up from the
    ///   source, [`MoveType::Normal`];
    /// - different-type occupant: the two swap places, [`MoveType::All`].
    pub fn move_item(
        &mut self,
        handle: Handle,
        parent: Handle,
        slot: u32,
    ) -> Result<MoveType, ItemError> {
        let info = *self.live(handle)?;
        let parent_type = self.slot_of(parent, slot)?.item_type;
        self.check_filter(parent_type, info.item_type)?;
        if self.is_within(parent, handle) {
            return Err(ItemError::ContainmentCycle { handle });
        }

        let Some(occupant) = self.occupant(parent, slot) else {
            self.relocate(handle, Some(Parent::new(parent, slot)));
            return Ok(MoveType::All);
        };
        if occupant == handle {
            return Err(ItemError::SlotOccupied { occupant });
        }
        let target = *self.live(occupant)?;

        if target.item_type == info.item_type {
            let room = self.stack_cap(target.item_type).saturating_sub(target.count);
            if room == 0 {
                return Err(ItemError::CapacityExceeded {
                    requested: info.count,
                    available: 0,
                });
            }
            let merged = info.count.min(room);
            return Ok(if merged == info.count {
                self.destroy_subtree(handle);
                self.top_up(occupant, merged, handle);
                MoveType::Reverse
            } else {
                self.take(handle, merged);
                self.top_up(occupant, merged, handle);
                MoveType::Normal
            });
        }

        // Swap: the occupant takes the source's old position.
        if let Some(home) = info.parent {
            let home_type = self.live(home.handle)?.item_type;
            self.check_filter(home_type, target.item_type)?;
            if self.is_within(home.handle, occupant) {
                return Err(ItemError::ContainmentCycle { handle: occupant });
            }
        }
        self.swap(handle, occupant);
        Ok(MoveType::All)
    }

    /// Exchange the positions of two live items, logging a `Move` for each.
    fn swap(&mut self, a: Handle, b: Handle) {
        let (Some(a_info), Some(b_info)) = (
            self.handles.try_get(a).copied(),
            self.handles.try_get(b).copied(),
        ) else {
            return;
        };
        for p in [a_info.parent, b_info.parent].into_iter().flatten() {
            self.children.remove(p.handle.index, p.slot);
        }
        let moves = [
            (a, a_info.parent, b_info.parent),
            (b, b_info.parent, a_info.parent),
        ];
        for (handle, _, next) in moves {
            if let Some(p) = next {
                self.children.add(p.handle.index, ChildEntry { slot: p.slot, handle });
            }
        }
        for (handle, previous, next) in moves {
            if let Some(info) = self.handles.try_get_mut(handle) {
                info.parent = next;
                let cmd = Command::moved(handle, info, previous);
                self.log.push(cmd);
            }
        }
    }

    /// Move half of `handle`'s units into the next free slot of its
    /// container, or into a new root when it has none.
    ///
    /// Returns the new item. Logs `Remove` then `Create`.
    pub fn split(&mut self, handle: Handle) -> Result<Handle, ItemError> {
        let info = *self.live(handle)?;
        match info.parent {
            Some(p) => self.split_into(handle, p.handle),
            None => {
                let half = info.count / 2;
                if half == 0 {
                    return Err(ItemError::ZeroCount);
                }
                self.take(handle, half);
                Ok(self.spawn(info.item_type, half, None, handle))
            }
        }
    }

    /// Move half of `handle`'s units into the first free slot of `parent`.
    pub fn split_into(&mut self, handle: Handle, parent: Handle) -> Result<Handle, ItemError> {
        let info = *self.live(handle)?;
        let half = info.count / 2;
        if half == 0 {
            return Err(ItemError::ZeroCount);
        }
        let parent_type = self.live(parent)?.item_type;
        self.check_filter(parent_type, info.item_type)?;
        let capacity = self.slot_cap(parent_type);
        let slot = self
            .children
            .first_free_slot(parent.index, capacity)
            .ok_or(ItemError::CapacityExceeded {
                requested: half,
                available: 0,
            })?;
        self.take(handle, half);
        Ok(self.spawn(
            info.item_type,
            half,
            Some(Parent::new(parent, slot)),
            handle,
        ))
    }

    /// Take `handle` out of its container, making it a root. Logs `Move`.
    pub fn detach_parent(&mut self, handle: Handle) -> Result<(), ItemError> {
        if self.live(handle)?.is_root() {
            return Err(ItemError::NotAttached { handle });
        }
        self.relocate(handle, None);
        Ok(())
    }

    /// Detach `count` units of `handle` as a new root.
    ///
    /// Detaching every unit detaches the item itself and returns `handle`;
    /// fewer units split off a new root item (`Remove`, then `Create`).
    pub fn detach_count(&mut self, handle: Handle, count: u32) -> Result<Handle, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        let info = *self.live(handle)?;
        if info.is_root() {
            return Err(ItemError::NotAttached { handle });
        }
        if count >= info.count {
            self.relocate(handle, None);
            return Ok(handle);
        }
        self.take(handle, count);
        Ok(self.spawn(info.item_type, count, None, handle))
    }
}
