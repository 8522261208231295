//! Core scheduling abstractions: entries, queues, admission, and the scheduler context.

pub mod admission;
pub mod audit;
pub mod cancel;
pub mod entry;
pub mod error;
pub mod executor;
pub mod queues;
pub mod registry;
pub mod reschedule;
pub mod scheduler;
pub mod semaphore;
pub mod service;
pub mod world;

pub use admission::{MachineCost, NoSurcharge, QueueRequest, Surcharge};
pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, SharedAuditSink,
};
pub use cancel::Selector;
pub use entry::{AdmittedEntry, EntryState, QueueEntry, RegisterSnapshot, Schedule, MAX_ARGS};
pub use error::{AppResult, QueueError};
pub use executor::CommandExecutor;
pub use queues::{ImmediateQueue, SemaphoreQueue, WaitQueue};
pub use registry::{IdentifierRegistry, Lane, Location};
pub use reschedule::{RelativeOffset, RescheduleMode};
pub use scheduler::Scheduler;
pub use semaphore::SemaphoreWait;
pub use service::{EntrySummary, QueueListing, QueueSection, TickReport};
pub use world::{adjust_counter, World};
