//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{QueueListing, QueueRequest, Scheduler, Selector, World};
use crate::util::clock::Timestamp;
use crate::util::serde::EntryId;

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier of the queued entry, on success.
    pub id: Option<EntryId>,
    /// Refusal reason, on failure.
    pub error: Option<String>,
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag: dequeueing is on and identifiers remain.
    pub ok: bool,
    /// Whether the service operations are enabled.
    pub dequeue_enabled: bool,
    /// Live identifiers.
    pub live: usize,
    /// Size of the identifier space.
    pub capacity: u32,
}

/// Submit a request, folding the result into a response body.
pub fn submit_request<W: World + ?Sized>(
    scheduler: &mut Scheduler,
    world: &mut W,
    request: &QueueRequest,
    now: Timestamp,
) -> SubmitResponse {
    match scheduler.submit(world, request, now) {
        Ok(id) => SubmitResponse {
            id: Some(id),
            error: None,
        },
        Err(err) => SubmitResponse {
            id: None,
            error: Some(err.to_string()),
        },
    }
}

/// Queue listing for `selector`.
#[must_use]
pub fn list_queue(scheduler: &Scheduler, selector: &Selector, now: Timestamp) -> QueueListing {
    scheduler.listing(selector, now)
}

/// Return a health payload.
#[must_use]
pub fn health(scheduler: &Scheduler) -> Health {
    let live = scheduler.live();
    let capacity = scheduler.config().max_ids;
    let full = u32::try_from(live).map_or(true, |n| n >= capacity);
    Health {
        ok: scheduler.dequeue_enabled() && !full,
        dequeue_enabled: scheduler.dequeue_enabled(),
        live,
        capacity,
    }
}
