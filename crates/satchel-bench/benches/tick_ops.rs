//! Criterion benchmarks for the lockstep tick: drain, apply, publish.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use satchel_bench::{churn_requests, reference_profile, CHEST};
use satchel_core::{Handle, ItemRequest, RequestOutcome, RequestPayload};
use satchel_engine::ItemWorld;

fn make_world(chests: usize) -> (ItemWorld, Vec<Handle>) {
    let mut world = ItemWorld::new(reference_profile()).unwrap();
    let reqs = (0..chests)
        .map(|_| {
            ItemRequest::new(RequestPayload::AddRoot {
                item_type: CHEST,
                count: 1,
            })
        })
        .collect();
    let result = world.step_sync(reqs).unwrap();
    let roots = result
        .receipts
        .iter()
        .filter_map(|r| match r.outcome {
            Some(RequestOutcome::Placed(p)) => Some(p.handle),
            _ => None,
        })
        .collect();
    (world, roots)
}

/// Benchmark: one tick of 256 placements and 64 removals.
fn bench_tick_churn(c: &mut Criterion) {
    let (mut world, roots) = make_world(64);
    let mut tick = 0u64;
    c.bench_function("tick_churn_256", |b| {
        b.iter(|| {
            let result = world.step_sync(churn_requests(tick, &roots, 256)).unwrap();
            tick += 1;
            black_box(result.metrics.commands_emitted);
        });
    });
}

/// Benchmark: an empty tick (phase entry, flush, publish).
fn bench_tick_empty(c: &mut Criterion) {
    let (mut world, _) = make_world(64);
    c.bench_function("tick_empty", |b| {
        b.iter(|| {
            let result = world.step_sync(Vec::new()).unwrap();
            black_box(result.tick);
        });
    });
}

criterion_group!(benches, bench_tick_churn, bench_tick_empty);
criterion_main!(benches);
