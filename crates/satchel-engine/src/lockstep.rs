//! Lockstep (synchronous) item world.
//!
//! [`ItemWorld`] is the primary user-facing API. Each call to
//! [`step_sync()`](ItemWorld::step_sync) submits requests, runs one write
//! phase, publishes the command log, and returns the receipts together
//! with the commands that tick produced.
//!
//! # Ownership model
//!
//! `ItemWorld` is [`Send`] (can be moved between threads). Parallel
//! readers get their own [`SharedArena`] clone via
//! [`shared()`](ItemWorld::shared) and must drop their read tickets
//! before the next step, or the step reports
//! [`PhaseError::ReadersActive`].

use std::sync::Arc;

use satchel_core::{Command, CommandConsumer, ItemRequest, PhaseError, Receipt, TickId};

use crate::config::{ConfigError, WorldConfig};
use crate::intent::IntentSender;
use crate::metrics::StepMetrics;
use crate::shared::SharedArena;
use crate::tick::TickEngine;

// Compile-time assertion: ItemWorld is Send.
// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<ItemWorld>();
    }
};

// ── StepResult ──────────────────────────────────────────────────

/// Result of a successful [`ItemWorld::step_sync()`] call.
#[derive(Debug)]
pub struct StepResult {
    /// The tick that just completed.
    pub tick: TickId,
    /// Submission rejections (e.g. `QueueFull`) followed by one receipt
    /// per drained request, in execution order.
    pub receipts: Vec<Receipt>,
    /// Commands committed during this tick.
    pub commands: Arc<[Command]>,
    /// Performance metrics for this tick.
    pub metrics: StepMetrics,
}

// ── ItemWorld ───────────────────────────────────────────────────

/// Single-threaded item world for lockstep execution.
///
/// # Example
///
/// ```
/// use satchel_core::{ItemRequest, ItemType, RequestPayload, TypeDef};
/// use satchel_engine::{ItemWorld, WorldConfig};
///
/// let mut world = ItemWorld::new(WorldConfig::new(vec![TypeDef::stack(20)])).unwrap();
/// let result = world
///     .step_sync(vec![ItemRequest::new(RequestPayload::AddRoot {
///         item_type: ItemType(0),
///         count: 5,
///     })])
///     .unwrap();
/// assert!(result.receipts[0].accepted);
/// assert_eq!(result.commands.len(), 1);
/// ```
pub struct ItemWorld {
    engine: TickEngine,
}

impl ItemWorld {
    /// Create a new world from a [`WorldConfig`].
    ///
    /// Validates the configuration and constructs an empty arena.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: TickEngine::new(config)?,
        })
    }

    /// Execute one tick synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if the write phase cannot be entered. The
    /// submitted requests stay queued for the next step; their submission
    /// receipts are dropped.
    pub fn step_sync(&mut self, requests: Vec<ItemRequest>) -> Result<StepResult, PhaseError> {
        let submit_receipts = self.engine.submit_requests(requests);

        // Accepted requests get their final receipts from execute_tick.
        let mut receipts: Vec<Receipt> = submit_receipts
            .into_iter()
            .filter(|r| !r.accepted)
            .collect();

        let tick_result = self.engine.execute_tick()?;
        receipts.extend(tick_result.receipts);
        Ok(StepResult {
            tick: self.engine.current_tick(),
            receipts,
            commands: self.engine.old_commands(),
            metrics: tick_result.metrics,
        })
    }

    /// Hand the last tick's commands to a consumer.
    pub fn feed(&self, consumer: &mut dyn CommandConsumer) {
        let commands = self.engine.old_commands();
        consumer.consume(self.engine.current_tick(), &commands);
    }

    /// Reset the world to tick 0 with an empty arena.
    pub fn reset(&mut self) -> Result<(), PhaseError> {
        self.engine.reset()
    }

    /// The arena behind its phase gate.
    pub fn shared(&self) -> &SharedArena {
        self.engine.shared()
    }

    /// Commands committed during the last tick.
    pub fn old_commands(&self) -> Arc<[Command]> {
        self.engine.old_commands()
    }

    /// A sender other threads can queue requests through.
    pub fn intent_sender(&self) -> IntentSender {
        self.engine.intent_sender()
    }

    /// Current tick ID (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.engine.current_tick()
    }

    /// Metrics from the most recent successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }
}

impl std::fmt::Debug for ItemWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemWorld")
            .field("current_tick", &self.engine.current_tick())
            .field("pending", &self.engine.pending())
            .field("shared", self.engine.shared())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{IngressError, ItemType, RequestPayload, TypeDef};

    fn world(queue: usize) -> ItemWorld {
        let mut config = WorldConfig::new(vec![TypeDef::stack(10)]);
        config.max_ingress_queue = queue;
        ItemWorld::new(config).unwrap()
    }

    fn add(count: u32) -> ItemRequest {
        ItemRequest::new(RequestPayload::AddRoot {
            item_type: ItemType(0),
            count,
        })
    }

    #[test]
    fn new_world_starts_at_tick_zero() {
        let w = world(8);
        assert_eq!(w.current_tick(), TickId(0));
        assert!(w.old_commands().is_empty());
    }

    #[test]
    fn step_sync_advances_and_publishes() {
        let mut w = world(8);
        let r = w.step_sync(vec![add(1), add(2)]).unwrap();
        assert_eq!(r.tick, TickId(1));
        assert_eq!(r.commands.len(), 2);
        let r = w.step_sync(vec![]).unwrap();
        assert_eq!(r.tick, TickId(2));
        assert!(r.commands.is_empty());
    }

    #[test]
    fn step_sync_surfaces_submission_rejections() {
        let mut w = world(1);
        let r = w.step_sync(vec![add(1), add(2)]).unwrap();
        assert_eq!(r.receipts.len(), 2);
        assert!(!r.receipts[0].accepted);
        assert_eq!(r.receipts[0].reason_code, Some(IngressError::QueueFull));
        assert_eq!(r.receipts[0].request_index, 1);
        assert!(r.receipts[1].accepted);
        assert_eq!(r.metrics.queue_full_rejections, 1);
    }

    #[test]
    fn reset_allows_continued_stepping() {
        let mut w = world(8);
        w.step_sync(vec![add(1)]).unwrap();
        w.reset().unwrap();
        assert_eq!(w.current_tick(), TickId(0));
        let r = w.step_sync(vec![add(3)]).unwrap();
        assert_eq!(r.tick, TickId(1));
        assert_eq!(w.shared().try_read().unwrap().len(), 1);
    }

    #[test]
    fn feed_passes_last_tick() {
        struct Count(usize, TickId);
        impl CommandConsumer for Count {
            fn consume(&mut self, tick: TickId, commands: &[Command]) {
                self.0 += commands.len();
                self.1 = tick;
            }
        }
        let mut w = world(8);
        w.step_sync(vec![add(1)]).unwrap();
        let mut c = Count(0, TickId(0));
        w.feed(&mut c);
        assert_eq!(c.0, 1);
        assert_eq!(c.1, TickId(1));
    }

    #[test]
    fn debug_impl_doesnt_panic() {
        let w = world(8);
        let s = format!("{w:?}");
        assert!(s.contains("ItemWorld"));
    }
}
