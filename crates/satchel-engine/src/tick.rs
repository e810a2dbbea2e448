//! Tick engine: the serialized write phase.
//!
//! [`TickEngine`] owns the shared arena, the ingress queue and the intent
//! inbox. Each [`execute_tick()`](TickEngine::execute_tick) enters one
//! write phase, applies every pending request in deterministic order,
//! flushes the command log and returns per-request receipts.
//!
//! Readers between ticks go through [`TickEngine::shared()`]; consumers
//! of the log read [`TickEngine::old_commands()`], which always trails
//! the arena by exactly one tick.

use std::sync::Arc;
use std::time::Instant;

use satchel_arena::ItemArena;
use satchel_core::{
    Command, IngressError, ItemError, ItemRequest, PhaseError, Receipt, RequestOrigin,
    RequestOutcome, RequestPayload, TickId,
};

use crate::config::{ConfigError, WorldConfig};
use crate::ingress::IngressQueue;
use crate::intent::{IntentInbox, IntentSender};
use crate::metrics::StepMetrics;
use crate::shared::SharedArena;

// ── TickResult ───────────────────────────────────────────────────

/// Result of a successful tick execution.
#[derive(Debug)]
pub struct TickResult {
    /// Receipts for requests drained this tick, in execution order.
    ///
    /// Intents that found the queue full come first. Receipts for intents
    /// carry [`RequestOrigin::Intent`] and are indexed by their position
    /// among the intents taken this tick.
    pub receipts: Vec<Receipt>,
    /// Performance metrics for this tick.
    pub metrics: StepMetrics,
}

// ── TickEngine ───────────────────────────────────────────────────

/// Tick engine for lockstep item processing.
pub struct TickEngine {
    shared: SharedArena,
    ingress: IngressQueue,
    inbox: IntentInbox,
    current_tick: TickId,
    published: Arc<[Command]>,
    last_metrics: StepMetrics,
}

impl TickEngine {
    /// Construct a new tick engine from a [`WorldConfig`].
    ///
    /// Validates the configuration, builds the type table and an arena
    /// pre-sized from the arena config. Consumes the `WorldConfig`.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let types = config.type_table()?;
        let arena = ItemArena::new(types, config.arena);
        Ok(Self {
            shared: SharedArena::new(arena),
            ingress: IngressQueue::new(config.max_ingress_queue),
            inbox: IntentInbox::new(),
            current_tick: TickId(0),
            published: Arc::from(Vec::<Command>::new()),
            last_metrics: StepMetrics::default(),
        })
    }

    /// Submit requests to be applied in the next tick.
    ///
    /// Returns one receipt per request indicating acceptance into the
    /// queue or rejection.
    pub fn submit_requests(&mut self, requests: Vec<ItemRequest>) -> Vec<Receipt> {
        self.ingress.submit(requests)
    }

    /// A sender other threads can queue requests through.
    pub fn intent_sender(&self) -> IntentSender {
        self.inbox.sender()
    }

    /// Execute one tick.
    ///
    /// # Errors
    ///
    /// Returns the [`PhaseError`] if the write phase cannot be entered
    /// because readers (or a foreign writer) still hold the arena. Nothing
    /// is drained in that case; pending requests wait for the next call.
    pub fn execute_tick(&mut self) -> Result<TickResult, PhaseError> {
        let tick_start = Instant::now();
        let next_tick = TickId(self.current_tick.0 + 1);

        // 1. Enter the write phase. On failure requests stay queued.
        let mut arena = self.shared.try_write()?;

        // 2. Fold cross-thread intents into the queue.
        let mut receipts: Vec<Receipt> = self
            .ingress
            .submit_from(self.inbox.take(), RequestOrigin::Intent)
            .into_iter()
            .filter(|r| !r.accepted)
            .collect();

        // 3. Drain in deterministic order and pre-size the log.
        let cmd_start = Instant::now();
        let drained = self.ingress.drain();
        arena.reserve_commands(drained.len() * 2);

        // 4. Apply.
        let mut applied = 0;
        for dr in drained {
            match apply(&mut arena, &dr.request.payload) {
                Ok(outcome) => {
                    applied += 1;
                    tracing::trace!(
                        tick = next_tick.0,
                        index = dr.request_index,
                        origin = ?dr.origin,
                        payload = ?dr.request.payload,
                        "request applied"
                    );
                    receipts.push(Receipt {
                        accepted: true,
                        applied_tick_id: Some(next_tick),
                        reason_code: None,
                        request_index: dr.request_index,
                        origin: dr.origin,
                        outcome: Some(outcome),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        tick = next_tick.0,
                        index = dr.request_index,
                        origin = ?dr.origin,
                        error = %e,
                        "request rejected"
                    );
                    receipts.push(
                        Receipt::rejected(dr.request_index, IngressError::Rejected(e))
                            .with_origin(dr.origin),
                    );
                }
            }
        }
        let command_processing_us = cmd_start.elapsed().as_micros() as u64;

        // 5. Publish the log.
        let publish_start = Instant::now();
        let commands_emitted = arena.flush();
        self.published = arena.old_commands();
        let publish_us = publish_start.elapsed().as_micros() as u64;
        let live_items = arena.len();
        drop(arena);

        // 6. Update state and build metrics.
        self.current_tick = next_tick;
        let metrics = StepMetrics {
            total_us: tick_start.elapsed().as_micros() as u64,
            command_processing_us,
            publish_us,
            commands_emitted,
            requests_applied: applied,
            requests_rejected: receipts.len() - applied,
            live_items,
            queue_full_rejections: self.ingress.queue_full_rejections(),
        };
        tracing::debug!(
            tick = next_tick.0,
            applied,
            commands = commands_emitted,
            live = live_items,
            "tick complete"
        );
        self.last_metrics = metrics.clone();

        Ok(TickResult { receipts, metrics })
    }

    /// Reset the engine to its initial state.
    ///
    /// Destroys every item without logging, drops pending requests and
    /// intents, and rewinds the tick counter. Handles issued before the
    /// reset stay stale.
    pub fn reset(&mut self) -> Result<(), PhaseError> {
        self.shared.try_write()?.clear();
        self.ingress.clear();
        self.inbox.clear();
        self.current_tick = TickId(0);
        self.published = Arc::from(Vec::<Command>::new());
        self.last_metrics = StepMetrics::default();
        Ok(())
    }

    /// The arena behind its phase gate.
    pub fn shared(&self) -> &SharedArena {
        &self.shared
    }

    /// Commands committed during the last tick.
    pub fn old_commands(&self) -> Arc<[Command]> {
        Arc::clone(&self.published)
    }

    /// Current tick ID.
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// Requests waiting in the ingress queue.
    pub fn pending(&self) -> usize {
        self.ingress.len()
    }

    /// Metrics from the most recent successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}

// ── Request dispatch ────────────────────────────────────────────

/// Apply one request payload to the arena.
pub(crate) fn apply(
    arena: &mut ItemArena,
    payload: &RequestPayload,
) -> Result<RequestOutcome, ItemError> {
    match *payload {
        RequestPayload::AddRoot { item_type, count } => {
            arena.add_root(item_type, count).map(RequestOutcome::Placed)
        }
        RequestPayload::Add {
            parent,
            slot,
            item_type,
            count,
        } => arena
            .add(parent, slot, item_type, count)
            .map(RequestOutcome::Placed),
        RequestPayload::Place {
            root,
            item_type,
            count,
            flags,
        } => arena
            .place(root, item_type, count, flags)
            .map(RequestOutcome::Placed),
        RequestPayload::MoveCount {
            handle,
            parent,
            slot,
            count,
        } => arena
            .move_count(handle, parent, slot, count)
            .map(RequestOutcome::Placed),
        RequestPayload::MoveItem {
            handle,
            parent,
            slot,
        } => arena
            .move_item(handle, parent, slot)
            .map(RequestOutcome::Moved),
        RequestPayload::Split { handle, into } => {
            let spawned = match into {
                Some(parent) => arena.split_into(handle, parent),
                None => arena.split(handle),
            };
            spawned.map(RequestOutcome::Spawned)
        }
        RequestPayload::Remove { handle, count } => {
            arena.remove(handle, count).map(RequestOutcome::Removed)
        }
        RequestPayload::RemoveMatching {
            handle,
            item_type,
            count,
            ref parent_types,
        } => {
            let mut siblings = Vec::new();
            let mut children = Vec::new();
            arena
                .remove_matching(
                    handle,
                    item_type,
                    count,
                    parent_types,
                    &mut siblings,
                    &mut children,
                )
                .map(RequestOutcome::Removed)
        }
        RequestPayload::AttachSibling { handle, sibling } => arena
            .attach_sibling(handle, sibling)
            .map(|()| RequestOutcome::Relinked),
        RequestPayload::DetachParent { handle } => arena
            .detach_parent(handle)
            .map(|()| RequestOutcome::Relinked),
        RequestPayload::DetachCount { handle, count } => arena
            .detach_count(handle, count)
            .map(RequestOutcome::Spawned),
        RequestPayload::Exchange { handle, item_type } => arena
            .compare_exchange(handle, item_type)
            .map(RequestOutcome::Exchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{CommandType, Handle, ItemType, TypeDef};

    const BAG: ItemType = ItemType(0);
    const COIN: ItemType = ItemType(1);

    fn engine() -> TickEngine {
        TickEngine::new(WorldConfig::new(vec![
            TypeDef::container(1, 4),
            TypeDef::stack(50),
        ]))
        .unwrap()
    }

    fn add_root(item_type: ItemType, count: u32) -> ItemRequest {
        ItemRequest::new(RequestPayload::AddRoot { item_type, count })
    }

    fn placed_handle(receipt: &Receipt) -> Handle {
        match receipt.outcome {
            Some(RequestOutcome::Placed(p)) => p.handle,
            other => panic!("expected placement, got {other:?}"),
        }
    }

    #[test]
    fn empty_tick_advances() {
        let mut e = engine();
        let result = e.execute_tick().unwrap();
        assert!(result.receipts.is_empty());
        assert_eq!(e.current_tick(), TickId(1));
        assert_eq!(result.metrics.commands_emitted, 0);
    }

    #[test]
    fn applied_requests_carry_tick_and_outcome() {
        let mut e = engine();
        e.submit_requests(vec![add_root(BAG, 1), add_root(COIN, 60)]);
        let result = e.execute_tick().unwrap();
        assert_eq!(result.receipts.len(), 2);
        for r in &result.receipts {
            assert!(r.accepted);
            assert_eq!(r.applied_tick_id, Some(TickId(1)));
        }
        match result.receipts[1].outcome {
            Some(RequestOutcome::Placed(p)) => assert_eq!(p.leftover, 10),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(result.metrics.requests_applied, 2);
        assert_eq!(result.metrics.live_items, 2);
        assert_eq!(e.old_commands().len(), 2);
    }

    #[test]
    fn rejected_request_leaves_no_commands() {
        let mut e = engine();
        e.submit_requests(vec![add_root(COIN, 0)]);
        let result = e.execute_tick().unwrap();
        let r = &result.receipts[0];
        assert!(!r.accepted);
        assert_eq!(r.applied_tick_id, None);
        assert_eq!(
            r.reason_code,
            Some(IngressError::Rejected(ItemError::ZeroCount))
        );
        assert_eq!(result.metrics.requests_rejected, 1);
        assert!(e.old_commands().is_empty());
    }

    #[test]
    fn later_request_sees_earlier_effects() {
        let mut e = engine();
        let bag = placed_handle(&{
            e.submit_requests(vec![add_root(BAG, 1)]);
            e.execute_tick().unwrap().receipts.remove(0)
        });
        e.submit_requests(vec![
            ItemRequest::new(RequestPayload::Add {
                parent: bag,
                slot: 2,
                item_type: COIN,
                count: 5,
            }),
            ItemRequest::new(RequestPayload::Remove {
                handle: bag,
                count: 0,
            }),
        ]);
        let result = e.execute_tick().unwrap();
        assert!(result.receipts.iter().all(|r| r.accepted));
        let kinds: Vec<CommandType> = e
            .old_commands()
            .iter()
            .map(|c| c.command_type)
            .collect();
        assert_eq!(
            kinds,
            vec![CommandType::Create, CommandType::Destroy, CommandType::Destroy]
        );
    }

    #[test]
    fn blocked_write_phase_keeps_requests_queued() {
        let mut e = engine();
        e.submit_requests(vec![add_root(COIN, 1)]);
        let shared = e.shared().clone();
        let reader = shared.try_read().unwrap();
        assert!(matches!(
            e.execute_tick(),
            Err(PhaseError::ReadersActive { .. })
        ));
        assert_eq!(e.pending(), 1);
        assert_eq!(e.current_tick(), TickId(0));
        drop(reader);
        let result = e.execute_tick().unwrap();
        assert_eq!(result.receipts.len(), 1);
    }

    #[test]
    fn intents_are_applied_next_tick() {
        let mut e = engine();
        let sender = e.intent_sender();
        sender.send(add_root(COIN, 3)).unwrap();
        let result = e.execute_tick().unwrap();
        assert_eq!(result.receipts.len(), 1);
        assert!(result.receipts[0].accepted);
        assert_eq!(result.receipts[0].origin, RequestOrigin::Intent);
        assert_eq!(e.shared().try_read().unwrap().len(), 1);
    }

    #[test]
    fn reset_clears_world() {
        let mut e = engine();
        e.submit_requests(vec![add_root(COIN, 3)]);
        let h = placed_handle(&e.execute_tick().unwrap().receipts[0]);
        e.submit_requests(vec![add_root(COIN, 3)]);
        e.reset().unwrap();
        assert_eq!(e.current_tick(), TickId(0));
        assert_eq!(e.pending(), 0);
        assert!(e.old_commands().is_empty());
        let arena = e.shared().try_read().unwrap();
        assert!(arena.is_empty());
        assert!(arena.try_get(h).is_none());
    }
}
