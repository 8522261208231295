//! Admission control: decides whether a command may be queued and builds its entry.
//!
//! Checks run in a fixed order (halted owner, payment, quota, identifier, payload size)
//! and the first failure wins. A refusal never leaves a registered entry behind.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::audit::AuditAction;
use super::cancel::Selector;
use super::entry::{
    payload_size, AdmittedEntry, EntryState, PayloadBlock, QueueEntry, RegisterSnapshot,
    Schedule,
};
use super::error::QueueError;
use super::registry::Location;
use super::scheduler::Scheduler;
use super::semaphore::SemaphoreWait;
use super::World;
use crate::util::clock::Timestamp;
use crate::util::serde::{CounterName, EntryId, ObjId};

const MSG_NO_MONEY: &str = "Not enough money to queue command.";
const MSG_RUNAWAY: &str = "Run away objects: too many commands queued.  Halted.";
const MSG_QUEUE_FULL: &str = "Could not queue command. The queue is full.";

/// Extra cost added on top of the wait cost at admission.
pub trait Surcharge: Send {
    /// Surcharge for a command whose base cost is `wait_cost`.
    fn surcharge(&mut self, wait_cost: u32) -> u32;
}

/// No surcharge at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSurcharge;

impl Surcharge for NoSurcharge {
    fn surcharge(&mut self, _wait_cost: u32) -> u32 {
        0
    }
}

/// One coin extra, one time in `one_in`.
#[derive(Debug)]
pub struct MachineCost {
    one_in: u32,
    rng: StdRng,
}

impl MachineCost {
    /// Surcharge drawing from an OS-seeded generator.
    #[must_use]
    pub fn new(one_in: u32) -> Self {
        Self {
            one_in,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic surcharge for tests and benchmarks.
    #[must_use]
    pub fn seeded(one_in: u32, seed: u64) -> Self {
        Self {
            one_in,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Surcharge for MachineCost {
    fn surcharge(&mut self, wait_cost: u32) -> u32 {
        if wait_cost > 0 && self.one_in > 0 && self.rng.random_range(0..self.one_in) == 0 {
            1
        } else {
            0
        }
    }
}

/// A complete request to queue one command: who, what, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRequest {
    /// Acting object.
    pub owner: ObjId,
    /// Object the command is attributed to.
    pub cause: ObjId,
    /// Command text.
    pub command: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Register snapshot.
    #[serde(default)]
    pub registers: RegisterSnapshot,
    /// Seconds to wait before running; zero or negative runs at the next service point.
    #[serde(default)]
    pub delay: i64,
    /// Semaphore to block on, as `(target, counter)`.
    #[serde(default)]
    pub semaphore: Option<(ObjId, CounterName)>,
}

impl QueueRequest {
    /// Run `command` for `owner`, caused by `cause`, as soon as possible.
    pub fn new(owner: ObjId, cause: ObjId, command: impl Into<String>) -> Self {
        Self {
            owner,
            cause,
            command: command.into(),
            args: Vec::new(),
            registers: RegisterSnapshot::default(),
            delay: 0,
            semaphore: None,
        }
    }

    /// Set positional arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the register snapshot.
    #[must_use]
    pub fn with_registers(mut self, registers: RegisterSnapshot) -> Self {
        self.registers = registers;
        self
    }

    /// Delay by `seconds`.
    #[must_use]
    pub fn after(mut self, seconds: i64) -> Self {
        self.delay = seconds;
        self
    }

    /// Block on the default counter of `target`.
    #[must_use]
    pub fn on_semaphore(mut self, target: ObjId) -> Self {
        self.semaphore = Some((target, CounterName::default()));
        self
    }

    /// Block on a named counter of `target`.
    #[must_use]
    pub fn on_counter(mut self, target: ObjId, counter: CounterName) -> Self {
        self.semaphore = Some((target, counter));
        self
    }
}

impl Scheduler {
    /// Quota in force for `principal`.
    pub fn quota_for<W: World + ?Sized>(&self, world: &W, principal: ObjId) -> u32 {
        if let Some(limit) = world.queue_limit(principal) {
            return limit;
        }
        if world.is_privileged(principal) {
            world
                .object_count()
                .saturating_add(1)
                .max(self.config.queue_max)
        } else {
            self.config.queue_max
        }
    }

    /// Run admission control and build an entry for `command`.
    ///
    /// The returned entry holds a registered identifier and counts against the
    /// principal's quota but sits in no queue; pass it to [`Scheduler::schedule`].
    ///
    /// # Errors
    ///
    /// * [`QueueError::AlreadyHalted`] if `owner` is halted or `NOTHING`.
    /// * [`QueueError::InsufficientFunds`] if the principal cannot pay.
    /// * [`QueueError::QuotaExceeded`] if the principal is over quota; every entry of
    ///   the principal is cancelled and `owner` halted.
    /// * [`QueueError::IdentifierExhausted`] if every identifier is live.
    /// * [`QueueError::PayloadTooLarge`] if the payload size overflows or exceeds the
    ///   configured limit.
    ///
    /// The charge taken in step two is kept on the last three paths.
    pub fn admit<W, S>(
        &mut self,
        world: &mut W,
        owner: ObjId,
        cause: ObjId,
        command: &str,
        args: &[S],
        registers: &RegisterSnapshot,
    ) -> Result<AdmittedEntry, QueueError>
    where
        W: World + ?Sized,
        S: AsRef<str>,
    {
        if owner.is_nothing() || world.is_halted(owner) {
            return Err(self.refuse(owner, QueueError::AlreadyHalted));
        }

        let principal = world.owner_of(owner);
        let wait_cost = self.config.wait_cost;
        let surcharge = self.surcharge.surcharge(wait_cost);
        if !world.charge(principal, wait_cost.saturating_add(surcharge)) {
            world.notify(principal, MSG_NO_MONEY);
            return Err(self.refuse(owner, QueueError::InsufficientFunds));
        }

        let limit = self.quota_for(world, principal);
        if self.outstanding(principal).saturating_add(1) > limit {
            world.notify(principal, MSG_RUNAWAY);
            let cancelled = self.cancel(world, &Selector::owner(principal));
            world.set_halted(owner);
            warn!(%owner, %principal, limit, cancelled, "runaway object halted");
            self.record(None, owner, AuditAction::Runaway, Some(format!("limit {limit}")));
            return Err(QueueError::QuotaExceeded {
                owner: principal,
                limit,
            });
        }

        let Some(id) = self.registry.allocate() else {
            world.notify(principal, MSG_QUEUE_FULL);
            return Err(self.refuse(owner, QueueError::IdentifierExhausted));
        };

        let limit = self.config.max_payload_bytes;
        let size = match payload_size(command, args, registers) {
            Some(size) if size <= limit => size,
            _ => return Err(self.refuse(owner, QueueError::PayloadTooLarge { limit })),
        };

        let entry = QueueEntry {
            id,
            owner,
            principal,
            cause,
            payload: PayloadBlock::pack(size, command, args, registers),
            wait_cost,
            surcharge,
            schedule: Schedule::Ready,
            state: EntryState::Active,
        };
        self.registry.insert(id, Location::Admitted);
        self.charge_outstanding(principal);
        self.record(Some(id), owner, AuditAction::Admit, None);
        Ok(AdmittedEntry(entry))
    }

    /// Discard an admitted entry that will not be scheduled, refunding its wait cost.
    pub fn abandon<W: World + ?Sized>(&mut self, world: &mut W, admitted: AdmittedEntry) {
        let entry = self.destroy(admitted.0);
        world.refund(entry.principal, u64::from(entry.wait_cost));
        self.release_outstanding(entry.principal, 1);
    }

    /// Admit and schedule a request in one step.
    ///
    /// Semaphore permission is checked before admission, so a refused semaphore wait
    /// costs nothing.
    ///
    /// # Errors
    ///
    /// Any error of [`Scheduler::admit`] or [`Scheduler::schedule`].
    pub fn submit<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        request: &QueueRequest,
        now: Timestamp,
    ) -> Result<EntryId, QueueError> {
        let wait = request
            .semaphore
            .as_ref()
            .map(|(target, counter)| SemaphoreWait::named(*target, counter.clone()));
        if let Some(wait) = &wait {
            if !world.can_write_counter(request.owner, wait.target, &wait.counter) {
                return Err(self.refuse(request.owner, QueueError::PermissionDenied));
            }
        }
        let admitted = self.admit(
            world,
            request.owner,
            request.cause,
            &request.command,
            &request.args,
            &request.registers,
        )?;
        let id = self.schedule(world, admitted, now, request.delay, wait)?;
        info!(%id, owner = %request.owner, delay = request.delay, "command queued");
        Ok(id)
    }

    fn refuse(&mut self, owner: ObjId, err: QueueError) -> QueueError {
        warn!(%owner, error = %err, "command refused");
        self.record(None, owner, AuditAction::Refuse, Some(err.to_string()));
        err
    }
}
