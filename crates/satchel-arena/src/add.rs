//! Add-family operations: new roots, slot inserts and searched placement.

use satchel_core::{Handle, ItemError, ItemType, Parent, Placement, SearchFlags};

use crate::arena::ItemArena;

impl ItemArena {
    /// Create a new root item holding up to one stack of `count` units.
    ///
    /// Units beyond the type's stack cap are reported as leftover. Logs
    /// one `Create`.
    pub fn add_root(&mut self, item_type: ItemType, count: u32) -> Result<Placement, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        let cap = self.def(item_type)?.count;
        if cap == 0 {
            return Err(ItemError::CapacityExceeded {
                requested: count,
                available: 0,
            });
        }
        let placed = count.min(cap);
        let handle = self.spawn(item_type, placed, None, Handle::EMPTY);
        Ok(Placement {
            handle,
            leftover: count - placed,
        })
    }

    /// Put `count` units of `item_type` into `slot` of `parent`.
    ///
    /// A same-type occupant is topped up (`Add`); an empty slot receives a
    /// new item (`Create`). Either way units beyond the stack cap come
    /// back as leftover.
    ///
    /// # Errors
    ///
    /// Fails without side effects on a zero count, a dead parent, a slot
    /// outside the parent's capacity, an unknown type, a filter rejection,
    /// a different-type occupant, or a full occupant.
    pub fn add(
        &mut self,
        parent: Handle,
        slot: u32,
        item_type: ItemType,
        count: u32,
    ) -> Result<Placement, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        let parent_type = self.slot_of(parent, slot)?.item_type;
        let cap = self.def(item_type)?.count;
        self.check_filter(parent_type, item_type)?;

        match self.occupant(parent, slot) {
            Some(occupant) => {
                let info = self.live(occupant)?;
                if info.item_type != item_type {
                    return Err(ItemError::SlotOccupied { occupant });
                }
                let room = cap.saturating_sub(info.count);
                if room == 0 {
                    return Err(ItemError::CapacityExceeded {
                        requested: count,
                        available: 0,
                    });
                }
                let placed = count.min(room);
                self.top_up(occupant, placed, Handle::EMPTY);
                Ok(Placement {
                    handle: occupant,
                    leftover: count - placed,
                })
            }
            None => {
                if cap == 0 {
                    return Err(ItemError::CapacityExceeded {
                        requested: count,
                        available: 0,
                    });
                }
                let placed = count.min(cap);
                let handle = self.spawn(
                    item_type,
                    placed,
                    Some(Parent::new(parent, slot)),
                    Handle::EMPTY,
                );
                Ok(Placement {
                    handle,
                    leftover: count - placed,
                })
            }
        }
    }

    /// [`find`](Self::find) a slot under `root`, then [`add`](Self::add) there.
    pub fn place(
        &mut self,
        root: Handle,
        item_type: ItemType,
        count: u32,
        flags: SearchFlags,
    ) -> Result<Placement, ItemError> {
        if count == 0 {
            return Err(ItemError::ZeroCount);
        }
        let found = self
            .find(root, item_type, count, flags)?
            .ok_or(ItemError::CapacityExceeded {
                requested: count,
                available: 0,
            })?;
        self.add(found.parent, found.slot, item_type, count)
    }
}

#[cfg(test)]
mod tests {
    use satchel_core::{CommandType, TypeDef};

    use super::*;
    use crate::config::ArenaConfig;

    const BAG: ItemType = ItemType(0);
    const ORE: ItemType = ItemType(1);
    const GEM: ItemType = ItemType(2);
    const GHOST: ItemType = ItemType(3);

    fn arena() -> ItemArena {
        ItemArena::from_defs(
            vec![
                TypeDef::container(1, 2).rejecting([GEM]),
                TypeDef::stack(6),
                TypeDef::stack(3),
                TypeDef::stack(0),
            ],
            ArenaConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn root_overflow_is_leftover() {
        let mut a = arena();
        let p = a.add_root(ORE, 10).unwrap();
        assert_eq!(a.try_get(p.handle).unwrap().count, 6);
        assert_eq!(p.leftover, 4);
        assert_eq!(a.commands().len(), 1);
        assert_eq!(a.commands()[0].command_type, CommandType::Create);
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let mut a = arena();
        let bag = a.add_root(BAG, 1).unwrap().handle;
        a.flush();
        assert_eq!(a.add(bag, 0, ORE, 0), Err(ItemError::ZeroCount));
        assert_eq!(a.add_root(ORE, 0), Err(ItemError::ZeroCount));
        assert!(a.commands().is_empty());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn add_tops_up_same_type() {
        let mut a = arena();
        let bag = a.add_root(BAG, 1).unwrap().handle;
        let ore = a.add(bag, 1, ORE, 4).unwrap().handle;
        a.flush();
        let p = a.add(bag, 1, ORE, 5).unwrap();
        assert_eq!(p.handle, ore);
        assert_eq!(p.leftover, 3);
        assert_eq!(a.try_get(ore).unwrap().count, 6);
        let cmd = a.commands()[0];
        assert_eq!(cmd.command_type, CommandType::Add);
        assert_eq!((cmd.count, cmd.source_count, cmd.destination_count), (2, 4, 6));
        assert_eq!(
            a.add(bag, 1, ORE, 1),
            Err(ItemError::CapacityExceeded {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn add_rejections_leave_no_trace() {
        let mut a = arena();
        let bag = a.add_root(BAG, 1).unwrap().handle;
        let ore = a.add(bag, 0, ORE, 1).unwrap().handle;
        a.flush();
        assert_eq!(
            a.add(bag, 2, ORE, 1),
            Err(ItemError::SlotOutOfRange {
                slot: 2,
                capacity: 2
            })
        );
        assert!(matches!(
            a.add(bag, 1, GEM, 1),
            Err(ItemError::FilterRejected { .. })
        ));
        assert_eq!(
            a.add(bag, 0, BAG, 1),
            Err(ItemError::SlotOccupied { occupant: ore })
        );
        assert!(matches!(
            a.add(Handle::new(9, 1), 0, ORE, 1),
            Err(ItemError::InvalidHandle { .. })
        ));
        assert!(matches!(
            a.add(bag, 1, ItemType(42), 1),
            Err(ItemError::TypeOutOfRange { .. })
        ));
        assert!(matches!(
            a.add(bag, 1, GHOST, 1),
            Err(ItemError::CapacityExceeded { .. })
        ));
        assert!(a.commands().is_empty());
        a.check_invariants().unwrap();
    }

    #[test]
    fn place_uses_search() {
        let mut a = arena();
        let bag = a.add_root(BAG, 1).unwrap().handle;
        let first = a.place(bag, ORE, 4, SearchFlags::ALL).unwrap();
        let second = a.place(bag, ORE, 2, SearchFlags::ALL).unwrap();
        assert_eq!(first.handle, second.handle);
        assert_eq!(a.try_get(first.handle).unwrap().count, 6);
        let third = a.place(bag, ORE, 1, SearchFlags::ALL).unwrap();
        assert_ne!(third.handle, first.handle);
        assert_eq!(a.try_get(third.handle).unwrap().parent_child_index(), 1);
        assert!(matches!(
            a.place(bag, GEM, 1, SearchFlags::ALL),
            Err(ItemError::CapacityExceeded { .. })
        ));
    }
}
