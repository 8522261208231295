//! # MUSH Queue
//!
//! The command queue scheduler of a multi-user virtual environment server.
//!
//! Players and objects issue commands that run right away, after a delay, or once some
//! other object releases a "semaphore". This crate decides whether a command may be
//! queued at all, keeps it in exactly one queue until it is due, and hands it to the
//! command interpreter when its turn comes.
//!
//! ## Core Problem Solved
//!
//! A shared world lets any user program objects, so the queue must protect itself:
//!
//! - **Runaway objects**: every principal has a quota of outstanding commands. Exceeding
//!   it halts all of the principal's queued work and the acting object.
//! - **Cost**: queueing a command costs a deposit, refunded when it runs or is cancelled.
//! - **Throttled object loops**: object-caused work waits one tick before it can run.
//!
//! ## Key Features
//!
//! - **Admission control**: halted check, payment, quota, identifier allocation, and
//!   overflow-checked payload sizing, in that order
//! - **Three queues**: immediate (player and object lanes), deadline-ordered wait, and
//!   semaphore-blocked
//! - **Semaphores**: counting waits with optional timeouts, release, notify-all and drain
//! - **Cancellation**: by owner, by object, or by identifier, with aggregated refunds
//! - **Rescheduling**: absolute or relative deadline changes by identifier
//! - **Service**: per-second tick, bounded execution, idle-sleep calculation, listings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mush_queue::config::QueueConfig;
//! use mush_queue::core::{QueueRequest, Scheduler};
//! use mush_queue::infra::InMemoryWorld;
//! use mush_queue::util::serde::ObjId;
//!
//! let mut world = InMemoryWorld::new().with_player(ObjId(1), 1000);
//! let mut queue = Scheduler::new(QueueConfig::default());
//!
//! let now = 0;
//! let id = queue.submit(&mut world, &QueueRequest::new(ObjId(1), ObjId(1), "say hi").after(5), now)?;
//!
//! queue.tick(&mut world, now + 5);
//! queue.run_top(&mut world, &mut |_q: &mut Scheduler, _w: &mut InMemoryWorld, e: &_| {
//!     println!("{}", e.command());
//! }, 10);
//! ```
//!
//! For complete examples, see:
//! - `tests/scenario_test.rs` - End-to-end queue scenarios
//! - `benches/queue_bench.rs` - Throughput benchmarks

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: entries, queues, admission, and the scheduler context.
pub mod core;
/// Configuration models and loaders.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters: in-memory world implementation.
pub mod infra;
/// Runtime driver and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
