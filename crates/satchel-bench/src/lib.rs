//! Benchmark profiles for the Satchel item arena.
//!
//! - [`reference_profile`]: a chest/bag/quiver type table with stackables
//! - [`populate`]: deterministic inventories of nested containers
//! - [`churn_requests`]: a per-tick request mix for engine benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use satchel_arena::ItemArena;
use satchel_core::{Handle, ItemError, ItemRequest, ItemType, RequestPayload, TypeDef};
use satchel_engine::WorldConfig;

pub const CHEST: ItemType = ItemType(0);
pub const BAG: ItemType = ItemType(1);
pub const QUIVER: ItemType = ItemType(2);
/// First stackable type; `STACKABLES` consecutive types follow.
pub const FIRST_STACKABLE: u32 = 3;
pub const STACKABLES: u32 = 12;

/// Type table: chest (24 slots), bag (8 slots), quiver (4 slots, arrows
/// only) and twelve stackables with caps from 5 to 60.
pub fn reference_profile() -> WorldConfig {
    let arrow = ItemType(FIRST_STACKABLE);
    let mut types = vec![
        TypeDef::container(1, 24),
        TypeDef::container(1, 8),
        TypeDef::container(1, 4).accepting([arrow]),
    ];
    types.extend((0..STACKABLES).map(|i| TypeDef::stack(5 * (i + 1))));
    let mut config = WorldConfig::new(types);
    config.arena.initial_items = 16 * 1024;
    config.max_ingress_queue = 4096;
    config
}

/// Stackable type `i` (wrapping).
pub fn stackable(i: u64) -> ItemType {
    ItemType(FIRST_STACKABLE + (i % u64::from(STACKABLES)) as u32)
}

/// Fill `chests` chests, each with a bag and a quiver in the first two
/// slots and stacks everywhere else. Returns the chest handles.
///
/// The layout depends only on `seed`.
pub fn populate(arena: &mut ItemArena, chests: usize, seed: u64) -> Result<Vec<Handle>, ItemError> {
    let mut roots = Vec::with_capacity(chests);
    let mut state = seed;
    for _ in 0..chests {
        let chest = arena.add_root(CHEST, 1)?.handle;
        let bag = arena.add(chest, 0, BAG, 1)?.handle;
        arena.add(chest, 1, QUIVER, 1)?;
        for slot in 2..24 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let ty = stackable(state >> 33);
            arena.add(chest, slot, ty, 1 + (state >> 60) as u32)?;
        }
        for slot in 0..4 {
            arena.add(bag, slot, stackable(u64::from(slot)), 2)?;
        }
        roots.push(chest);
    }
    arena.flush();
    Ok(roots)
}

/// Requests for one tick: `n` placements and `n / 4` removals spread
/// over `roots`.
pub fn churn_requests(tick: u64, roots: &[Handle], n: usize) -> Vec<ItemRequest> {
    let mut reqs = Vec::with_capacity(n + n / 4);
    if roots.is_empty() {
        return reqs;
    }
    for i in 0..n as u64 {
        let root = roots[((tick + i) % roots.len() as u64) as usize];
        reqs.push(
            ItemRequest::new(RequestPayload::Place {
                root,
                item_type: stackable(tick + i),
                count: 1,
                flags: Default::default(),
            })
            .from_source(i, tick),
        );
    }
    for i in 0..(n / 4) as u64 {
        let root = roots[((tick * 7 + i) % roots.len() as u64) as usize];
        reqs.push(ItemRequest::new(RequestPayload::RemoveMatching {
            handle: root,
            item_type: stackable(tick + i),
            count: 1,
            parent_types: Default::default(),
        }));
    }
    reqs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ItemArena {
        let config = reference_profile();
        ItemArena::from_defs(config.types, config.arena).unwrap()
    }

    #[test]
    fn reference_profile_validates() {
        reference_profile().validate().unwrap();
    }

    #[test]
    fn populate_is_deterministic() {
        let mut a = arena();
        let mut b = arena();
        populate(&mut a, 8, 42).unwrap();
        populate(&mut b, 8, 42).unwrap();
        assert_eq!(a.old_commands(), b.old_commands());
        // chest + bag + quiver + 22 stacks + 4 bag stacks
        assert_eq!(a.len(), 8 * 29);
        a.check_invariants().unwrap();
    }

    #[test]
    fn churn_requests_cover_every_root() {
        let mut a = arena();
        let roots = populate(&mut a, 4, 1).unwrap();
        let reqs = churn_requests(3, &roots, 8);
        assert_eq!(reqs.len(), 10);
        for root in &roots {
            assert!(reqs.iter().any(|r| matches!(
                r.payload,
                RequestPayload::Place { root: h, .. } if h == *root
            )));
        }
    }
}
