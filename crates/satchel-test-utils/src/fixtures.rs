//! Standard item types shared by tests and benchmarks.
//!
//! | Type | Kind | Stack | Slots |
//! |------|------|-------|-------|
//! | [`BACKPACK`] | container | 1 | 3 |
//! | [`POUCH`] | container, holds arrows and coins only | 1 | 2 |
//! | [`ARROW`] | stack | 6 | - |
//! | [`TORCH`] | stack | 4 | - |
//! | [`LIT_TORCH`] | stack | 4 | - |
//! | [`COIN`] | stack, [`GOLD`] counts as coin | 100 | - |
//! | [`GOLD`] | stack | 100 | - |

use satchel_arena::{ArenaConfig, ItemArena};
use satchel_core::{ItemType, TypeDef};

pub const BACKPACK: ItemType = ItemType(0);
pub const POUCH: ItemType = ItemType(1);
pub const ARROW: ItemType = ItemType(2);
pub const TORCH: ItemType = ItemType(3);
pub const LIT_TORCH: ItemType = ItemType(4);
pub const COIN: ItemType = ItemType(5);
pub const GOLD: ItemType = ItemType(6);

/// The fixture type table, indexed by the constants above.
pub fn fixture_types() -> Vec<TypeDef> {
    vec![
        TypeDef::container(1, 3),
        TypeDef::container(1, 2).accepting([ARROW, COIN, GOLD]),
        TypeDef::stack(6),
        TypeDef::stack(4),
        TypeDef::stack(4),
        TypeDef::stack(100).with_fungibles([GOLD]),
        TypeDef::stack(100),
    ]
}

/// An empty arena over [`fixture_types`].
pub fn fixture_arena() -> ItemArena {
    match ItemArena::from_defs(fixture_types(), ArenaConfig::default()) {
        Ok(arena) => arena,
        Err(e) => panic!("fixture types invalid: {e}"),
    }
}
