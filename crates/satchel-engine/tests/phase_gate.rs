//! Parallel read phases feeding a serialized write phase.
//!
//! Worker threads read the shared arena and queue intents; the world's
//! step applies them once every reader has released its ticket.

use satchel_core::{IngressError, PhaseError, TickId};
use satchel_engine::{ItemWorld, WorldConfig};
use satchel_test_utils::{add_root, fixture_types, produced_handle, ARROW, COIN};

const WORKERS: u64 = 4;

fn world() -> ItemWorld {
    ItemWorld::new(WorldConfig::new(fixture_types())).unwrap()
}

#[test]
fn parallel_readers_queue_intents_for_next_tick() {
    let mut w = world();
    for tick in 0..10u64 {
        std::thread::scope(|s| {
            for worker in 0..WORKERS {
                let shared = w.shared().clone();
                let tx = w.intent_sender();
                s.spawn(move || {
                    let live = shared.try_read().unwrap().len() as u64;
                    assert_eq!(live, tick * WORKERS);
                    tx.send(add_root(COIN, (worker + 1) as u32).from_source(worker, tick))
                        .unwrap();
                });
            }
        });
        let result = w.step_sync(vec![]).unwrap();
        assert_eq!(result.receipts.len(), WORKERS as usize);
        assert!(result.receipts.iter().all(|r| r.accepted));
        // Source keys fix the order no matter which thread sent first.
        let counts: Vec<u32> = result.commands.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }
    assert_eq!(w.current_tick(), TickId(10));
}

#[test]
fn outstanding_reader_blocks_the_step() {
    let mut w = world();
    let shared = w.shared().clone();
    let ticket = shared.try_read().unwrap();

    let err = w.step_sync(vec![add_root(ARROW, 2)]).unwrap_err();
    assert!(matches!(err, PhaseError::ReadersActive { .. }));
    assert_eq!(w.current_tick(), TickId(0));
    drop(ticket);

    // The blocked request is still queued and lands on the next step.
    let result = w.step_sync(vec![]).unwrap();
    assert_eq!(result.receipts.len(), 1);
    assert_eq!(result.tick, TickId(1));
    let h = produced_handle(&result.receipts[0]);
    assert_eq!(shared.try_read().unwrap().try_get(h).unwrap().count, 2);
}

#[test]
fn read_phase_follows_the_last_write() {
    let mut w = world();
    w.step_sync(vec![add_root(ARROW, 1)]).unwrap();
    w.step_sync(vec![]).unwrap();
    let shared = w.shared();
    assert_eq!(shared.last_write_phase(), 2);
    let ticket = shared.try_read().unwrap();
    assert_eq!(ticket.phase(), 2);
    assert_eq!(shared.last_read_phase(), 2);
}

#[test]
fn outside_writer_blocks_readers_and_step() {
    let mut w = world();
    let shared = w.shared().clone();
    let mut writer = shared.try_write().unwrap();
    writer.add_root(ARROW, 1).unwrap();

    assert!(matches!(
        shared.try_read(),
        Err(PhaseError::WriterActive { phase: 1 })
    ));
    assert!(matches!(
        w.step_sync(vec![]),
        Err(PhaseError::WriterActive { .. })
    ));
    drop(writer);

    // The outside write is published with the next tick.
    let result = w.step_sync(vec![]).unwrap();
    assert_eq!(result.commands.len(), 1);
}

#[test]
fn intents_fail_once_the_world_is_gone() {
    let w = world();
    let tx = w.intent_sender();
    drop(w);
    assert_eq!(tx.send(add_root(COIN, 1)), Err(IngressError::Disconnected));
}
