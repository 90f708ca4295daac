//! Broker microbenchmarks using Criterion.
//!
//! These benchmarks measure individual broker operations in isolation:
//! - Emit to an existing channel with a varying receiver count
//! - First emission parked and replayed by the first receiver
//! - Join barrier updates

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use teleport::{Broker, BrokerConfig, Cadence, Joined, Payload};
use teleport_bench::fixtures::{Message, names};

// =============================================================================
// Emit Benchmarks
// =============================================================================

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");

    for receivers in [1, 16, 256] {
        group.throughput(Throughput::Elements(receivers as u64));

        group.bench_with_input(BenchmarkId::new("typed", receivers), &receivers, |b, &n| {
            let broker = Broker::new();
            let _handles: Vec<_> = (0..n)
                .map(|_| {
                    broker.receive("bench", |message: &Message| {
                        black_box(message.id);
                    })
                })
                .collect();
            let message = Message::new(1);

            b.iter(|| {
                broker.emit("bench", message.clone());
            });
        });

        group.bench_with_input(BenchmarkId::new("payload", receivers), &receivers, |b, &n| {
            let broker = Broker::new();
            let _handles: Vec<_> = (0..n)
                .map(|_| {
                    broker.receive_payload("bench", |payload: &Payload| {
                        black_box(payload.type_name());
                    })
                })
                .collect();
            let payload = Payload::new(Message::new(1));

            b.iter(|| {
                broker.emit_payload("bench", payload.clone());
            });
        });
    }

    group.finish();
}

// =============================================================================
// Replay Benchmarks
// =============================================================================

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for count in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(count as u64));

        // Park one emission per name, then replay each into its first receiver.
        group.bench_with_input(BenchmarkId::new("park_then_receive", count), &count, |b, &n| {
            let channels = names("replay", n);
            b.iter(|| {
                let broker = Broker::new();
                for channel in &channels {
                    broker.emit(channel, 1_u32);
                }
                for channel in &channels {
                    black_box(broker.receive(channel, |value: &u32| {
                        black_box(*value);
                    }));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Join Benchmarks
// =============================================================================

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");

    for members in [2, 8, 32] {
        group.throughput(Throughput::Elements(members as u64));

        for cadence in [Cadence::EveryUpdate, Cadence::FreshRound] {
            let id = format!("{cadence:?}");
            group.bench_with_input(BenchmarkId::new(id, members), &members, |b, &n| {
                let broker = Broker::with_config(BrokerConfig::default().with_cadence(cadence));
                let channels = names("join", n);
                let _handle = broker.multi_receive(&channels, |joined: &Joined| {
                    black_box(joined.len());
                });

                b.iter(|| {
                    for (index, channel) in channels.iter().enumerate() {
                        broker.emit(channel, index);
                    }
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_emit, bench_replay, bench_join);
criterion_main!(benches);
