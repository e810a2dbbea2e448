//! Tick engine for the Satchel item arena.
//!
//! Parallel systems read the arena through a non-blocking phase gate and
//! queue [`ItemRequest`](satchel_core::ItemRequest)s; one serialized
//! write phase per tick applies them in deterministic order and publishes
//! the command log for downstream consumers.
//!
//! # Architecture
//!
//! ```text
//! ItemWorld (lockstep facade)
//! └── TickEngine
//!     ├── SharedArena   (Arc<RwLock<ItemArena>> + phase counters)
//!     ├── IngressQueue  (bounded, sorted drain)
//!     └── IntentInbox   (crossbeam channel fed by IntentSender)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod ingress;
pub mod intent;
pub mod lockstep;
pub mod metrics;
pub mod shared;
pub mod tick;

pub use config::{ConfigError, WorldConfig};
pub use ingress::{DrainedRequest, IngressQueue};
pub use intent::IntentSender;
pub use lockstep::{ItemWorld, StepResult};
pub use metrics::StepMetrics;
pub use shared::{ReadTicket, SharedArena, WriteTicket};
pub use tick::{TickEngine, TickResult};
