//! Error types for queue operations.

use thiserror::Error;

use crate::util::serde::ObjId;

/// Refusals produced by the command queue. None of them are fatal to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The owner could not pay the wait cost. No entry was created.
    #[error("not enough money to queue command")]
    InsufficientFunds,
    /// The owner has too many outstanding entries; all of them were cancelled and the
    /// acting object halted.
    #[error("run away objects: {owner} exceeded queue limit of {limit}")]
    QuotaExceeded {
        /// Principal whose quota was exceeded.
        owner: ObjId,
        /// The limit in force.
        limit: u32,
    },
    /// Every identifier is in use.
    #[error("the queue is full")]
    IdentifierExhausted,
    /// Payload size would overflow or exceeds the configured limit.
    #[error("payload too large to queue (limit {limit} bytes)")]
    PayloadTooLarge {
        /// Configured byte limit.
        limit: usize,
    },
    /// The identifier is malformed or not associated with a live entry.
    #[error("that PID is not associated with an active queue entry")]
    InvalidId,
    /// A wait time could not be parsed.
    #[error("that is not a valid wait time")]
    InvalidTime,
    /// The caller does not control the entry's owner.
    #[error("permission denied")]
    NotControlling,
    /// The entry or acting object has already been halted.
    #[error("that queue entry has already been halted")]
    AlreadyHalted,
    /// A semaphore wait without a timeout cannot be rescheduled.
    #[error("that semaphore does not have a wait time")]
    NoTimeout,
    /// The caller may not write the requested semaphore counter.
    #[error("permission denied on semaphore counter")]
    PermissionDenied,
    /// Queue servicing is switched off.
    #[error("automatic dequeueing is disabled")]
    Disabled,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
