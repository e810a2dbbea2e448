//! Satchel: a generational item arena for game inventories.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Satchel sub-crates. For most users, adding `satchel` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use satchel::prelude::*;
//!
//! // A backpack with three slots and a stackable arrow type.
//! let config = WorldConfig::new(vec![TypeDef::container(1, 3), TypeDef::stack(20)]);
//! let mut world = ItemWorld::new(config).unwrap();
//!
//! let result = world
//!     .step_sync(vec![ItemRequest::new(RequestPayload::AddRoot {
//!         item_type: ItemType(0),
//!         count: 1,
//!     })])
//!     .unwrap();
//! let pack = match result.receipts[0].outcome {
//!     Some(RequestOutcome::Placed(p)) => p.handle,
//!     _ => unreachable!(),
//! };
//!
//! world
//!     .step_sync(vec![ItemRequest::new(RequestPayload::Place {
//!         root: pack,
//!         item_type: ItemType(1),
//!         count: 12,
//!         flags: SearchFlags::ALL,
//!     })])
//!     .unwrap();
//!
//! let arena = world.shared().try_read().unwrap();
//! assert_eq!(arena.count_of(pack, ItemType(1), &[]).unwrap(), 12);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `satchel-core` | Handles, item records, commands, requests, errors, traits |
//! | [`arena`] | `satchel-arena` | `ItemArena`, type tables, command log |
//! | [`engine`] | `satchel-engine` | Phase gate, ingress queue, tick engine, lockstep world |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`satchel-core`).
pub use satchel_core as types;

/// The item arena and its tables (`satchel-arena`).
///
/// Use [`arena::ItemArena`] directly when no tick engine is needed.
pub use satchel_arena as arena;

/// Tick engine and phase gate (`satchel-engine`).
///
/// [`engine::ItemWorld`] for synchronous stepping,
/// [`engine::SharedArena`] for parallel read phases.
pub use satchel_engine as engine;

/// Common imports for typical Satchel usage.
///
/// ```rust
/// use satchel::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use satchel_arena::{interpret, ArenaConfig, ItemArena};

    // Core types and traits
    pub use satchel_core::{
        ChildEntry, Command, CommandConsumer, CommandEvent, CommandType, Found, FoundKind, Handle,
        Info, ItemReader, ItemRequest, ItemType, MoveType, Placement, Receipt, RequestOrigin,
        RequestOutcome, RequestPayload, SearchFlags, TickId, TypeDef,
    };

    // Errors
    pub use satchel_core::{IngressError, ItemError, PhaseError};

    // Engine
    pub use satchel_engine::{
        ConfigError, IntentSender, ItemWorld, SharedArena, StepMetrics, StepResult, WorldConfig,
    };
}
