//! Benchmarks for the command queue scheduler.
//!
//! Benchmarks cover:
//! - Admission and immediate execution
//! - Wait queue insertion and per-second promotion
//! - Semaphore blocking and release
//! - Bulk cancellation with refund aggregation
//! - End-to-end mixed workload

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use mush_queue::config::QueueConfig;
use mush_queue::core::{CommandExecutor, NoSurcharge, QueueEntry, QueueRequest, Scheduler, Selector};
use mush_queue::infra::InMemoryWorld;
use mush_queue::util::clock::Timestamp;
use mush_queue::util::serde::{CounterName, ObjId};

// ============================================================================
// Fixtures
// ============================================================================

const PLAYER: ObjId = ObjId(1);
const THING: ObjId = ObjId(2);
const NOW: Timestamp = 1_000_000;

struct BenchExecutor;

impl CommandExecutor<InMemoryWorld> for BenchExecutor {
    fn execute(&mut self, _queue: &mut Scheduler, _world: &mut InMemoryWorld, entry: &QueueEntry) {
        black_box(entry.command());
    }
}

fn world() -> InMemoryWorld {
    InMemoryWorld::new()
        .with_player(PLAYER, u64::MAX / 2)
        .with_object(THING, PLAYER)
}

fn scheduler(size: u64) -> Scheduler {
    let size = u32::try_from(size).unwrap_or(u32::MAX);
    Scheduler::new(QueueConfig {
        queue_max: size + 1,
        max_ids: size + 1,
        ..QueueConfig::default()
    })
    .with_surcharge(Box::new(NoSurcharge))
}

fn request(i: u64) -> QueueRequest {
    QueueRequest::new(PLAYER, PLAYER, format!("say {i}")).with_args([format!("arg-{i}")])
}

// ============================================================================
// Immediate queue
// ============================================================================

fn bench_submit_and_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_and_run");

    for size in [100, 1_000, 5_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut world = world();
                let mut queue = scheduler(size);
                for i in 0..size {
                    queue.submit(&mut world, &request(i), NOW).unwrap();
                }
                let ran = queue.run_top(&mut world, &mut BenchExecutor, usize::MAX);
                black_box(ran);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Wait queue
// ============================================================================

fn bench_wait_insert_and_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("wait_insert_and_tick");

    for size in [100, 1_000, 2_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut world = world();
                let mut queue = scheduler(size);
                for i in 0..size {
                    // scattered deadlines exercise sorted insertion
                    let delay = i64::try_from((i * 7919) % 600).unwrap_or(0) + 1;
                    queue.submit(&mut world, &request(i).after(delay), NOW).unwrap();
                }
                let mut moved = 0;
                for second in 1..=600 {
                    moved += queue.tick(&mut world, NOW + second).due;
                }
                black_box(moved);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Semaphores
// ============================================================================

fn bench_semaphore_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("semaphore_release");
    let sem = CounterName::default();

    for size in [100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut world = world();
                let mut queue = scheduler(size);
                for i in 0..size {
                    queue
                        .submit(&mut world, &request(i).on_semaphore(THING), NOW)
                        .unwrap();
                }
                let mut woken = 0;
                while woken < size as usize {
                    woken += queue.release(&mut world, THING, &sem, -1);
                }
                black_box(woken);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Cancellation
// ============================================================================

fn bench_cancel_owner(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel_owner");

    for size in [100, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut world = world();
                let mut queue = scheduler(size);
                for i in 0..size {
                    let req = match i % 3 {
                        0 => request(i),
                        1 => request(i).after(30),
                        _ => request(i).on_semaphore(THING),
                    };
                    queue.submit(&mut world, &req, NOW).unwrap();
                }
                black_box(queue.cancel(&mut world, &Selector::owner(PLAYER)));
            });
        });
    }
    group.finish();
}

// ============================================================================
// End-to-End Scenario
// ============================================================================

fn bench_end_to_end_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end_scenario");
    let sem = CounterName::default();

    group.bench_function("mixed_workload", |b| {
        b.iter(|| {
            let mut world = world();
            let mut queue = scheduler(2_000);
            for i in 0..1_000u64 {
                let req = match i % 10 {
                    0..=4 => request(i),
                    5..=7 => request(i).after(i64::try_from(i % 5).unwrap_or(0) + 1),
                    8 => QueueRequest::new(THING, THING, "beep"),
                    _ => request(i).on_semaphore(THING).after(3),
                };
                queue.submit(&mut world, &req, NOW).unwrap();
            }
            for second in 0..6 {
                queue.tick(&mut world, NOW + second);
                queue.release(&mut world, THING, &sem, -10);
                while queue.run_top(&mut world, &mut BenchExecutor, 10) > 0 {}
            }
            black_box(queue.live());
        });
    });
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(immediate_benches, bench_submit_and_run);

criterion_group!(wait_benches, bench_wait_insert_and_tick);

criterion_group!(semaphore_benches, bench_semaphore_release);

criterion_group!(cancel_benches, bench_cancel_owner);

criterion_group!(scenario_benches, bench_end_to_end_scenario);

criterion_main!(
    immediate_benches,
    wait_benches,
    semaphore_benches,
    cancel_benches,
    scenario_benches
);
