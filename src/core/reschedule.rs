//! Adjusting the deadline of a queued wait.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::audit::AuditAction;
use super::entry::Schedule;
use super::error::QueueError;
use super::registry::Location;
use super::scheduler::Scheduler;
use super::World;
use crate::util::clock::Timestamp;
use crate::util::serde::{EntryId, ObjId};

/// A relative time adjustment as typed by a user.
///
/// `+5` and `-5` adjust the current deadline; an unsigned `5` counts from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeOffset {
    /// Signed number of seconds.
    pub value: i64,
    /// Whether the text carried a leading `+` or `-`.
    pub explicit_sign: bool,
}

impl FromStr for RelativeOffset {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let explicit_sign = s.starts_with(['+', '-']);
        let value = s.parse::<i64>().map_err(|_| QueueError::InvalidTime)?;
        Ok(Self {
            value,
            explicit_sign,
        })
    }
}

/// How to compute the new deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RescheduleMode {
    /// Run at this time; negative means now.
    Absolute(Timestamp),
    /// Shift relative to the current deadline or to now.
    Relative(RelativeOffset),
}

fn new_deadline(mode: RescheduleMode, current: Timestamp, now: Timestamp) -> Timestamp {
    match mode {
        RescheduleMode::Absolute(t) if t < 0 => now,
        RescheduleMode::Absolute(t) => t,
        RescheduleMode::Relative(RelativeOffset {
            value,
            explicit_sign,
        }) => {
            let base = if explicit_sign { current } else { now };
            match base.saturating_add(value) {
                t if t >= 0 => t,
                _ if explicit_sign && value < 0 => now,
                _ => Timestamp::MAX,
            }
        }
    }
}

impl Scheduler {
    /// Change when a waiting entry runs. Returns the new deadline.
    ///
    /// Wait-queue entries are re-sorted; semaphore waits keep their place and only get a
    /// new timeout.
    ///
    /// # Errors
    ///
    /// * [`QueueError::InvalidId`] if no scheduled entry has that identifier.
    /// * [`QueueError::AlreadyHalted`] if the entry was halted.
    /// * [`QueueError::NotControlling`] unless `actor` controls the entry's owner.
    /// * [`QueueError::NoTimeout`] if the entry has no deadline to adjust.
    pub fn reschedule<W: World + ?Sized>(
        &mut self,
        world: &W,
        actor: ObjId,
        id: EntryId,
        mode: RescheduleMode,
        now: Timestamp,
    ) -> Result<Timestamp, QueueError> {
        let location = self.registry.locate(id).ok_or(QueueError::InvalidId)?;
        let entry = self.entry(id).ok_or(QueueError::InvalidId)?;
        if !entry.is_active() {
            return Err(QueueError::AlreadyHalted);
        }
        let owner = entry.owner;
        if !world.controls(actor, owner) {
            return Err(QueueError::NotControlling);
        }
        let current = entry.schedule.deadline().ok_or(QueueError::NoTimeout)?;
        let deadline = new_deadline(mode, current, now);

        match location {
            Location::Wait => {
                let mut entry = self.wait.remove(id).ok_or(QueueError::InvalidId)?;
                entry.schedule = Schedule::At(deadline);
                self.wait.insert(entry);
            }
            Location::Semaphore => {
                let entry = self.semaphore.get_mut(id).ok_or(QueueError::InvalidId)?;
                if let Schedule::Semaphore { timeout, .. } = &mut entry.schedule {
                    *timeout = Some(deadline);
                }
            }
            Location::Admitted | Location::Immediate(_) => return Err(QueueError::NoTimeout),
        }

        info!(%id, %actor, deadline, "queue entry rescheduled");
        self.record(
            Some(id),
            actor,
            AuditAction::Reschedule,
            Some(format!("deadline {deadline}")),
        );
        Ok(deadline)
    }
}
