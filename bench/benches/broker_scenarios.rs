//! Broker scenario benchmarks using Criterion.
//!
//! These benchmarks measure representative workloads:
//! - Fan-out (few channels, many receivers)
//! - Joins (many barriers fed in a shuffled order)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use teleport::Cadence;
use teleport_bench::scenarios::{
    FanOutConfig, FanOutScenario, JoinConfig, JoinScenario, Scenario,
};

// =============================================================================
// Fan-out Benchmarks
// =============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/fan_out");

    for receivers in [16, 128, 1_024] {
        let mut scenario = FanOutScenario::with_config(FanOutConfig {
            receivers_per_channel: receivers,
            ..Default::default()
        });
        group.throughput(Throughput::Elements(scenario.deliveries_per_update() as u64));

        group.bench_function(BenchmarkId::new("round", receivers), |b| {
            scenario.setup();
            b.iter(|| scenario.update());
            scenario.teardown();
        });
    }

    group.finish();
}

// =============================================================================
// Join Benchmarks
// =============================================================================

fn bench_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/joins");

    for groups in [8, 64, 512] {
        for cadence in [Cadence::EveryUpdate, Cadence::FreshRound] {
            let mut scenario = JoinScenario::with_config(JoinConfig {
                groups,
                cadence,
                ..Default::default()
            });
            group.throughput(Throughput::Elements(scenario.deliveries_per_update() as u64));

            group.bench_function(BenchmarkId::new(format!("{cadence:?}"), groups), |b| {
                scenario.setup();
                b.iter(|| scenario.update());
                scenario.teardown();
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_fan_out, bench_joins);
criterion_main!(benches);
