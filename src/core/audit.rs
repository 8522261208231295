//! Audit sink implementations.
//!
//! Every queue decision worth reconstructing later (admissions, refusals, halts, wakes,
//! executions) can be mirrored into an [`AuditSink`]. The in-memory sink is a bounded
//! ring buffer for tests and `@ps`-style diagnostics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;
use crate::util::serde::{EntryId, ObjId};

/// What happened to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Passed admission control.
    Admit,
    /// Refused by admission control.
    Refuse,
    /// Quota exceeded; the principal's queue was halted.
    Runaway,
    /// Cancelled by a selector.
    Cancel,
    /// Cancelled by identifier.
    CancelId,
    /// Deadline adjusted.
    Reschedule,
    /// Moved to the immediate queue by a release or timeout.
    Wake,
    /// Handed to the executor.
    Execute,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Entry concerned, when there is one.
    pub entry_id: Option<EntryId>,
    /// Object on whose behalf the action happened.
    pub actor: ObjId,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards into a shared buffer, so a test can keep a handle while the
/// scheduler owns the sink.
#[derive(Clone, Default)]
pub struct SharedAuditSink {
    inner: std::sync::Arc<parking_lot::Mutex<Vec<AuditEvent>>>,
}

impl SharedAuditSink {
    /// Create an empty shared sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    /// Actions recorded so far, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<AuditAction> {
        self.inner.lock().iter().map(|e| e.action).collect()
    }
}

impl AuditSink for SharedAuditSink {
    fn record(&mut self, event: AuditEvent) {
        self.inner.lock().push(event);
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    entry_id: Option<EntryId>,
    actor: ObjId,
    action: AuditAction,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        entry_id,
        actor,
        action,
        created_at_ms: now_ms(),
        detail,
    }
}
