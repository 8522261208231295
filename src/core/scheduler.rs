//! The scheduler context: every queue, the identifier registry and per-principal
//! accounting in one explicitly passed object.
//!
//! Operations are spread over sibling modules by concern (`admission`, `semaphore`,
//! `reschedule`, `cancel`, `service`); this module holds the state and the small
//! helpers they share.

use std::collections::HashMap;

use tracing::debug;

use super::admission::{MachineCost, Surcharge};
use super::audit::{build_audit_event, AuditAction, AuditSink};
use super::entry::{EntryState, QueueEntry, Schedule};
use super::queues::{ImmediateQueue, SemaphoreQueue, WaitQueue};
use super::registry::{IdentifierRegistry, Lane, Location};
use super::World;
use crate::config::{ConfigError, QueueConfig};
use crate::util::serde::{EntryId, ObjId};

/// Command queue scheduler.
///
/// All mutation goes through `&mut self`; there is no internal locking. Construct one at
/// startup and hand it to whatever drives the server loop.
pub struct Scheduler {
    pub(crate) config: QueueConfig,
    pub(crate) registry: IdentifierRegistry,
    pub(crate) immediate: ImmediateQueue,
    pub(crate) wait: WaitQueue,
    pub(crate) semaphore: SemaphoreQueue,
    /// Outstanding entries per principal. Absent means zero.
    pub(crate) outstanding: HashMap<ObjId, u32>,
    pub(crate) surcharge: Box<dyn Surcharge>,
    audit: Option<Box<dyn AuditSink>>,
    pub(crate) dequeue_enabled: bool,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("live", &self.registry.len())
            .field("player_lane", &self.immediate.len(Lane::Player))
            .field("object_lane", &self.immediate.len(Lane::Object))
            .field("wait", &self.wait.len())
            .field("semaphore", &self.semaphore.len())
            .field("dequeue_enabled", &self.dequeue_enabled)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create an empty scheduler. The machine-cost surcharge draws from an OS-seeded RNG.
    ///
    /// `config` is taken as is. Use [`Scheduler::try_new`] or
    /// [`crate::builders::build_scheduler`] for configuration from outside the program.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        let surcharge = Box::new(MachineCost::new(config.machine_cost));
        Self {
            registry: IdentifierRegistry::new(config.max_ids),
            immediate: ImmediateQueue::default(),
            wait: WaitQueue::default(),
            semaphore: SemaphoreQueue::default(),
            outstanding: HashMap::new(),
            surcharge,
            audit: None,
            dequeue_enabled: config.dequeue_enabled,
            config,
        }
    }

    /// Validate `config`, then create an empty scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn try_new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Replace the random surcharge policy.
    #[must_use]
    pub fn with_surcharge(mut self, surcharge: Box<dyn Surcharge>) -> Self {
        self.surcharge = surcharge;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Turn the service operations (`tick`, `run_top`) on or off.
    pub fn set_dequeue_enabled(&mut self, enabled: bool) {
        self.dequeue_enabled = enabled;
    }

    /// Whether the service operations are enabled.
    #[must_use]
    pub const fn dequeue_enabled(&self) -> bool {
        self.dequeue_enabled
    }

    /// Outstanding entries charged to `principal`.
    #[must_use]
    pub fn outstanding(&self, principal: ObjId) -> u32 {
        self.outstanding.get(&principal).copied().unwrap_or(0)
    }

    /// Where a live entry is.
    #[must_use]
    pub fn locate(&self, id: EntryId) -> Option<Location> {
        self.registry.locate(id)
    }

    /// Look up a linked entry by identifier.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&QueueEntry> {
        match self.registry.locate(id)? {
            Location::Immediate(lane) => self.immediate.lane(lane).find(|e| e.id == id),
            Location::Wait => self.wait.iter().find(|e| e.id == id),
            Location::Semaphore => self.semaphore.iter().find(|e| e.id == id),
            Location::Admitted => None,
        }
    }

    /// Number of live identifiers, including admitted-but-unscheduled entries and lazily
    /// deleted ones awaiting reaping.
    #[must_use]
    pub fn live(&self) -> usize {
        self.registry.len()
    }

    /// The identifier registry.
    #[must_use]
    pub const fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    /// The immediate queue.
    #[must_use]
    pub const fn immediate(&self) -> &ImmediateQueue {
        &self.immediate
    }

    /// The wait queue.
    #[must_use]
    pub const fn wait_queue(&self) -> &WaitQueue {
        &self.wait
    }

    /// The semaphore queue.
    #[must_use]
    pub const fn semaphore_queue(&self) -> &SemaphoreQueue {
        &self.semaphore
    }

    pub(crate) fn lane_for<W: World + ?Sized>(world: &W, cause: ObjId) -> Lane {
        if world.is_player(cause) {
            Lane::Player
        } else {
            Lane::Object
        }
    }

    /// Link a ready entry into the immediate queue.
    pub(crate) fn link_immediate<W: World + ?Sized>(&mut self, world: &W, mut entry: QueueEntry) {
        entry.schedule = Schedule::Ready;
        let lane = Self::lane_for(world, entry.cause);
        self.registry.relocate(entry.id, Location::Immediate(lane));
        self.immediate.push(lane, entry);
    }

    pub(crate) fn link_wait(&mut self, entry: QueueEntry) {
        self.registry.relocate(entry.id, Location::Wait);
        self.wait.insert(entry);
    }

    pub(crate) fn link_semaphore(&mut self, entry: QueueEntry) {
        self.registry.relocate(entry.id, Location::Semaphore);
        self.semaphore.push(entry);
    }

    /// Drop the registry mapping of an unlinked entry. The only place an identifier is
    /// released.
    pub(crate) fn destroy(&mut self, mut entry: QueueEntry) -> QueueEntry {
        let released = self.registry.release(entry.id);
        debug_assert!(released, "entry {} destroyed twice", entry.id);
        entry.state = EntryState::Removed;
        debug!(id = %entry.id, "queue entry destroyed");
        entry
    }

    pub(crate) fn charge_outstanding(&mut self, principal: ObjId) {
        *self.outstanding.entry(principal).or_insert(0) += 1;
    }

    pub(crate) fn release_outstanding(&mut self, principal: ObjId, count: u32) {
        if let Some(n) = self.outstanding.get_mut(&principal) {
            *n = n.saturating_sub(count);
            if *n == 0 {
                self.outstanding.remove(&principal);
            }
        }
    }

    pub(crate) fn record(
        &mut self,
        entry_id: Option<EntryId>,
        actor: ObjId,
        action: AuditAction,
        detail: Option<String>,
    ) {
        if let Some(sink) = self.audit.as_mut() {
            sink.record(build_audit_event(entry_id, actor, action, detail));
        }
    }
}
