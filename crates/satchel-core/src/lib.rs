//! Core types and traits for the Satchel item arena.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Satchel workspace:
//! handles and type IDs, item records, command log records, requests and
//! receipts, error types, and core traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod id;
pub mod item;
pub mod outcome;
pub mod request;
pub mod traits;
pub mod types;

pub use command::{events, Command, CommandEvent, CommandType};
pub use error::{IngressError, ItemError, PhaseError};
pub use id::{Handle, ItemType, TickId, TypeList};
pub use item::{ChildEntry, Info, Parent};
pub use outcome::{Exchanged, Found, FoundKind, MoveType, Placement, SearchFlags};
pub use request::{ItemRequest, Receipt, RequestOrigin, RequestOutcome, RequestPayload};
pub use traits::{CommandConsumer, ItemReader};
pub use types::TypeDef;
