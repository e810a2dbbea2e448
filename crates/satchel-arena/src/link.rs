//! Sibling linking and in-place type exchange.

use satchel_core::{Command, Exchanged, Handle, ItemError, ItemType};

use crate::arena::ItemArena;

impl ItemArena {
    /// Point `handle`'s sibling link at `sibling`; [`Handle::EMPTY`]
    /// clears it. Logs one `Connect`.
    ///
    /// # Errors
    ///
    /// [`ItemError::SiblingCycle`] if the chain starting at `sibling`
    /// leads back to `handle`.
    pub fn attach_sibling(&mut self, handle: Handle, sibling: Handle) -> Result<(), ItemError> {
        self.live(handle)?;
        let link = sibling.non_empty();
        if let Some(s) = link {
            self.live(s)?;
            if s == handle || self.sibling_chain(s).any(|h| h == handle) {
                return Err(ItemError::SiblingCycle { handle });
            }
        }
        self.link(handle, link);
        Ok(())
    }

    /// Change the type of `handle` in place.
    ///
    /// The item keeps its index, position, count and contents but is
    /// reissued under the next version, so `handle` goes stale. The parent
    /// slot, every child and every sibling link naming the item are
    /// re-pointed at the new handle, so it keeps its chain membership. Logs a
    /// `Destroy` of the old handle immediately followed by a `Create` of
    /// the new one, which consumers read as a rename.
    ///
    /// # Errors
    ///
    /// Fails without side effects when the type is unchanged or unknown,
    /// the count exceeds the new stack cap, the container refuses the new
    /// type, or the current contents would not fit or be accepted.
    pub fn compare_exchange(
        &mut self,
        handle: Handle,
        item_type: ItemType,
    ) -> Result<Exchanged, ItemError> {
        let info = *self.live(handle)?;
        if info.item_type == item_type {
            return Err(ItemError::SameType { item_type });
        }
        let def = self.def(item_type)?;
        let (cap, capacity) = (def.count, def.capacity);
        if info.count > cap {
            return Err(ItemError::CapacityExceeded {
                requested: info.count,
                available: cap,
            });
        }
        if let Some(p) = info.parent {
            let parent_type = self.live(p.handle)?.item_type;
            self.check_filter(parent_type, item_type)?;
        }
        for entry in self.children.children(handle.index) {
            if entry.slot >= capacity {
                return Err(ItemError::SlotOutOfRange {
                    slot: entry.slot,
                    capacity,
                });
            }
            let child_type = self.live(entry.handle)?.item_type;
            self.check_filter(item_type, child_type)?;
        }

        let Some(renamed) = self.handles.bump_version(handle.index) else {
            return Err(ItemError::InvalidHandle { handle });
        };
        self.log.push(Command::destroy(handle, &info));
        let Some(updated) = self.handles.try_get_mut(renamed) else {
            return Err(ItemError::InvalidHandle { handle: renamed });
        };
        updated.item_type = item_type;
        let updated = *updated;

        if let Some(p) = updated.parent {
            self.children.replace(p.handle.index, p.slot, renamed);
        }
        let contents: Vec<Handle> = self
            .children
            .children(handle.index)
            .iter()
            .map(|e| e.handle)
            .collect();
        for child in contents {
            if let Some(c) = self.handles.try_get_mut(child) {
                if let Some(p) = c.parent.as_mut() {
                    p.handle = renamed;
                }
            }
        }
        let linked: Vec<Handle> = self
            .handles
            .iter()
            .filter(|(_, i)| i.sibling == Some(handle))
            .map(|(h, _)| h)
            .collect();
        for h in linked {
            if let Some(i) = self.handles.try_get_mut(h) {
                i.sibling = Some(renamed);
            }
        }
        self.log.push(Command::create(renamed, &updated, handle));
        tracing::trace!(
            %handle,
            %renamed,
            from = %info.item_type,
            to = %item_type,
            "type exchanged"
        );

        Ok(Exchanged {
            handle: renamed,
            previous_type: info.item_type,
            info: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use satchel_core::{CommandType, TypeDef};

    use super::*;
    use crate::config::ArenaConfig;

    const CRATE: ItemType = ItemType(0);
    const ORE: ItemType = ItemType(1);
    const INGOT: ItemType = ItemType(2);
    const SMALL: ItemType = ItemType(3);
    const BIN: ItemType = ItemType(4);

    fn arena() -> ItemArena {
        ItemArena::from_defs(
            vec![
                TypeDef::container(1, 4),
                TypeDef::stack(20),
                TypeDef::stack(8),
                TypeDef::container(1, 1),
                TypeDef::container(1, 4).accepting([ORE]),
            ],
            ArenaConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn sibling_cycles_are_refused() {
        let mut a = arena();
        let x = a.add_root(ORE, 1).unwrap().handle;
        let y = a.add_root(ORE, 1).unwrap().handle;
        let z = a.add_root(ORE, 1).unwrap().handle;
        a.attach_sibling(x, y).unwrap();
        a.attach_sibling(y, z).unwrap();
        a.flush();
        assert_eq!(a.attach_sibling(z, x), Err(ItemError::SiblingCycle { handle: z }));
        assert_eq!(a.attach_sibling(x, x), Err(ItemError::SiblingCycle { handle: x }));
        assert!(a.commands().is_empty());
    }

    #[test]
    fn attach_logs_connect_and_clears() {
        let mut a = arena();
        let x = a.add_root(ORE, 1).unwrap().handle;
        let y = a.add_root(ORE, 1).unwrap().handle;
        a.flush();
        a.attach_sibling(x, y).unwrap();
        a.attach_sibling(x, Handle::EMPTY).unwrap();
        assert_eq!(a.try_get(x).unwrap().sibling, None);
        let cmds = a.commands();
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().all(|c| c.command_type == CommandType::Connect));
        assert_eq!(cmds[0].destination_sibling, Some(y));
        assert_eq!(cmds[1].source_sibling, Some(y));
    }

    #[test]
    fn exchange_reissues_handle_and_repoints_tree() {
        let mut a = arena();
        let outer = a.add_root(CRATE, 1).unwrap().handle;
        let ore = a.add(outer, 2, ORE, 6).unwrap().handle;
        a.flush();
        let ex = a.compare_exchange(ore, INGOT).unwrap();
        assert_eq!(ex.handle.index, ore.index);
        assert_eq!(ex.handle.version, ore.version + 1);
        assert_eq!(ex.previous_type, ORE);
        assert!(a.try_get(ore).is_none());
        assert_eq!(a.try_get(ex.handle).unwrap().item_type, INGOT);
        assert_eq!(a.occupant(outer, 2), Some(ex.handle));
        let kinds: Vec<CommandType> = a.commands().iter().map(|c| c.command_type).collect();
        assert_eq!(kinds, vec![CommandType::Destroy, CommandType::Create]);
        assert!(a.commands().iter().all(|c| c.destination.index == ore.index));
        a.check_invariants().unwrap();
    }

    #[test]
    fn exchange_repoints_children() {
        let mut a = arena();
        let outer = a.add_root(CRATE, 1).unwrap().handle;
        let ore = a.add(outer, 0, ORE, 1).unwrap().handle;
        let ex = a.compare_exchange(outer, BIN).unwrap();
        assert_eq!(a.try_get(ore).unwrap().parent_handle(), ex.handle);
        assert_eq!(a.get_children(ex.handle).unwrap().len(), 1);
        a.check_invariants().unwrap();
    }

    #[test]
    fn exchange_repoints_inbound_sibling_links() {
        let mut a = arena();
        let outer = a.add_root(CRATE, 1).unwrap().handle;
        let head = a.add(outer, 0, ORE, 10).unwrap().handle;
        let overflow = a.add_root(ORE, 4).unwrap().handle;
        a.attach_sibling(head, overflow).unwrap();
        a.flush();

        let ex = a.compare_exchange(overflow, INGOT).unwrap();
        assert_eq!(a.try_get(head).unwrap().sibling, Some(ex.handle));
        assert_eq!(a.count_of(outer, INGOT, &[]).unwrap(), 4);
        assert!(a.contains(outer, INGOT, 4, &[]).unwrap());
        // Re-pointing is not logged: only the rename pair.
        let kinds: Vec<CommandType> = a.commands().iter().map(|c| c.command_type).collect();
        assert_eq!(kinds, vec![CommandType::Destroy, CommandType::Create]);
        a.check_invariants().unwrap();
    }

    #[test]
    fn exchange_validates_before_mutating() {
        let mut a = arena();
        let outer = a.add_root(CRATE, 1).unwrap().handle;
        let ore = a.add(outer, 2, ORE, 12).unwrap().handle;
        a.add(outer, 3, INGOT, 1).unwrap();
        a.flush();
        assert_eq!(a.compare_exchange(ore, ORE), Err(ItemError::SameType { item_type: ORE }));
        assert_eq!(
            a.compare_exchange(ore, INGOT),
            Err(ItemError::CapacityExceeded {
                requested: 12,
                available: 8
            })
        );
        assert!(matches!(
            a.compare_exchange(outer, SMALL),
            Err(ItemError::SlotOutOfRange { slot: 2, capacity: 1 })
        ));
        assert!(matches!(
            a.compare_exchange(outer, BIN),
            Err(ItemError::FilterRejected { .. })
        ));
        assert!(a.commands().is_empty());
        assert!(a.try_get(ore).is_some());
    }
}
