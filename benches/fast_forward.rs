//! Fast-forward benchmarks for the handball engine
//!
//! Measures whole synchronous attempts at various plan lengths, plus the
//! parallel batch runner.
//!
//! Run with: cargo bench --bench fast_forward

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use handball_engine::batch::{random_plan, run_batch, BatchConfig};
use handball_engine::game::engine::MatchEngine;
use handball_engine::game::fast_forward::run_sync;
use handball_engine::game::rng::MatchRng;
use handball_engine::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot, Stats};
use handball_engine::game::systems::defense::DefenseBehavior;
use handball_engine::metrics::BatchMetrics;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Engine for a seeded random plan of `steps` steps
fn create_engine(steps: usize, seed: u64, behavior: DefenseBehavior) -> MatchEngine {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = random_plan(&mut rng, steps).expect("generated plans are valid");
    let opponent = OpponentDescriptor::new("Bench", behavior, Stats::uniform(10.0));
    MatchEngine::new(MatchSetup::new(RosterSnapshot::default(), opponent, plan).with_rng(MatchRng::new(seed)))
}

/// Single attempts at increasing plan length
fn bench_run_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_sync");
    group.sample_size(50);

    for steps in [1, 3, 5, 8] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("steps", steps), &steps, |b, &steps| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                let mut engine = create_engine(steps, seed, DefenseBehavior::Balanced);
                black_box(run_sync(&mut engine, 10_000))
            });
        });
    }

    group.finish();
}

/// One attempt per defense behavior, same plan
fn bench_behaviors(c: &mut Criterion) {
    let mut group = c.benchmark_group("behaviors");

    for behavior in DefenseBehavior::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(behavior), &behavior, |b, &behavior| {
            b.iter(|| {
                let mut engine = create_engine(4, 7, behavior);
                black_box(run_sync(&mut engine, 10_000))
            });
        });
    }

    group.finish();
}

/// Parallel batch across every behavior
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);

    for samples in [10, 50] {
        let config = BatchConfig {
            samples,
            ..Default::default()
        };
        group.throughput(Throughput::Elements((samples * DefenseBehavior::ALL.len()) as u64));
        group.bench_with_input(BenchmarkId::new("samples", samples), &config, |b, config| {
            b.iter(|| {
                let metrics = BatchMetrics::new();
                black_box(run_batch(config, &metrics).expect("generated plans are valid"))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run_sync, bench_behaviors, bench_batch);
criterion_main!(benches);
