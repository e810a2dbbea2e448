//! Generational item arena for Satchel.
//!
//! Items live in a slot table addressed by versioned [`Handle`]s. A
//! separate child index records which container slots are occupied, and
//! a per-tick command log records every structural mutation for
//! consumers that trail the arena by one tick.
//!
//! # Architecture
//!
//! ```text
//! ItemArena
//! ├── HandleTable   (index → versioned Info slot, lowest-free reuse)
//! ├── ChildIndex    (parent index → occupied slots, sorted)
//! ├── TypeTable     (TypeDef list + positive/negative/fungible filters)
//! └── CommandLog    (current Vec<Command> + published Arc<[Command]>)
//! ```
//!
//! # Failure semantics
//!
//! Every operation validates before it mutates. An `Err` means the arena
//! and the log are exactly as they were; an `Ok` means every change the
//! operation made is in the log, in order.
//!
//! [`Handle`]: satchel_core::Handle

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod add;
pub mod arena;
pub mod child_index;
pub mod config;
pub mod error;
pub mod handle_table;
mod link;
pub mod log;
mod moves;
mod remove;
pub mod search;
pub mod type_table;

// Public re-exports for the primary API surface.
pub use arena::ItemArena;
pub use child_index::ChildIndex;
pub use config::ArenaConfig;
pub use error::{InvariantError, TypeTableError};
pub use handle_table::HandleTable;
pub use log::{interpret, CommandLog};
pub use type_table::{FilterTables, TypeTable};
