//! Cancellation: bulk halts by owner or object, single-id halts, and refund settlement.
//!
//! Entries in the immediate queue are halted in place and reaped when popped; entries in
//! the wait and semaphore queues are removed at once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::audit::AuditAction;
use super::entry::{QueueEntry, Schedule};
use super::error::QueueError;
use super::registry::Location;
use super::scheduler::Scheduler;
use super::world::adjust_counter;
use super::World;
use crate::util::serde::{EntryId, ObjId};

/// Which entries a bulk cancel applies to. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// Principal charged for the entry.
    pub owner: Option<ObjId>,
    /// Acting object of the entry.
    pub object: Option<ObjId>,
}

impl Selector {
    /// Every entry.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            owner: None,
            object: None,
        }
    }

    /// Entries charged to `principal`.
    #[must_use]
    pub const fn owner(principal: ObjId) -> Self {
        Self {
            owner: Some(principal),
            object: None,
        }
    }

    /// Entries acted by `object`.
    #[must_use]
    pub const fn object(object: ObjId) -> Self {
        Self {
            owner: None,
            object: Some(object),
        }
    }

    /// Whether `entry` is live and matches.
    #[must_use]
    pub fn matches(&self, entry: &QueueEntry) -> bool {
        entry.is_active()
            && self.owner.is_none_or(|p| entry.principal == p)
            && self.object.is_none_or(|o| entry.owner == o)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Owed {
    amount: u64,
    entries: u32,
}

/// Refunds accumulated per principal and paid out once each.
#[derive(Debug, Default)]
struct RefundLedger {
    owed: HashMap<ObjId, Owed>,
}

impl RefundLedger {
    fn add(&mut self, entry: &QueueEntry) {
        let owed = self.owed.entry(entry.principal).or_default();
        owed.amount = owed.amount.saturating_add(u64::from(entry.wait_cost));
        owed.entries = owed.entries.saturating_add(1);
    }

    fn settle<W: World + ?Sized>(self, queue: &mut Scheduler, world: &mut W) {
        for (principal, owed) in self.owed {
            world.refund(principal, owed.amount);
            queue.release_outstanding(principal, owed.entries);
        }
    }
}

impl Scheduler {
    /// Halt every live entry matching `selector`. Returns how many were halted.
    ///
    /// Cancelling the same selector twice halts nothing the second time.
    pub fn cancel<W: World + ?Sized>(&mut self, world: &mut W, selector: &Selector) -> usize {
        let mut ledger = RefundLedger::default();
        let mut reaped = Vec::new();
        for entry in self.immediate.iter_mut().filter(|e| selector.matches(e)) {
            ledger.add(entry);
            reaped.push((entry.id, entry.owner));
            entry.mark_reaped();
        }

        let waits = self.wait.drain_where(|e| selector.matches(e));
        let sems = self.semaphore.drain_where(|e| selector.matches(e), None);
        let count = reaped.len() + waits.len() + sems.len();

        for entry in waits.into_iter().chain(sems) {
            ledger.add(&entry);
            let entry = self.unlink_blocked(world, entry);
            self.record(Some(entry.id), entry.owner, AuditAction::Cancel, None);
        }
        for (id, owner) in reaped {
            self.record(Some(id), owner, AuditAction::Cancel, None);
        }
        ledger.settle(self, world);

        if count > 0 {
            info!(owner = ?selector.owner, object = ?selector.object, count, "queue entries halted");
        }
        count
    }

    /// Halt a single entry by identifier.
    ///
    /// # Errors
    ///
    /// * [`QueueError::InvalidId`] if no scheduled entry has that identifier.
    /// * [`QueueError::AlreadyHalted`] if the entry was already halted.
    /// * [`QueueError::NotControlling`] unless `actor` controls the entry's owner or may
    ///   halt anything.
    pub fn cancel_by_id<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        actor: ObjId,
        id: EntryId,
    ) -> Result<(), QueueError> {
        let location = match self.registry.locate(id) {
            Some(Location::Admitted) | None => return Err(QueueError::InvalidId),
            Some(location) => location,
        };
        let entry = self.entry(id).ok_or(QueueError::InvalidId)?;
        if !entry.is_active() {
            return Err(QueueError::AlreadyHalted);
        }
        let owner = entry.owner;
        if !(world.controls(actor, owner) || world.can_halt(actor)) {
            return Err(QueueError::NotControlling);
        }

        let mut ledger = RefundLedger::default();
        match location {
            Location::Immediate(lane) => {
                if let Some(entry) = self.immediate.get_mut(lane, id) {
                    ledger.add(entry);
                    entry.mark_reaped();
                }
            }
            Location::Wait => {
                if let Some(entry) = self.wait.remove(id) {
                    ledger.add(&entry);
                    self.unlink_blocked(world, entry);
                }
            }
            Location::Semaphore => {
                if let Some(entry) = self.semaphore.remove(id) {
                    ledger.add(&entry);
                    self.unlink_blocked(world, entry);
                }
            }
            Location::Admitted => return Err(QueueError::InvalidId),
        }
        ledger.settle(self, world);

        info!(%id, %actor, %owner, "queue entry halted");
        self.record(Some(id), actor, AuditAction::CancelId, None);
        Ok(())
    }

    /// Destroy entries already unlinked from their queue, refunding their owners.
    pub(crate) fn discard_all<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        entries: Vec<QueueEntry>,
    ) -> usize {
        let mut ledger = RefundLedger::default();
        let count = entries.len();
        for entry in entries {
            ledger.add(&entry);
            self.destroy(entry);
        }
        ledger.settle(self, world);
        count
    }

    /// Destroy an entry taken from the wait or semaphore queue. A semaphore waiter gives
    /// back its increment.
    fn unlink_blocked<W: World + ?Sized>(&mut self, world: &mut W, entry: QueueEntry) -> QueueEntry {
        if let Schedule::Semaphore {
            target, counter, ..
        } = &entry.schedule
        {
            adjust_counter(world, entry.owner, *target, counter, -1);
        }
        self.destroy(entry)
    }
}
