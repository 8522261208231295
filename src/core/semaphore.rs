//! Scheduling admitted entries and semaphore counter semantics.
//!
//! A semaphore counter counts waiters minus releases. Blocking increments it; a release
//! of `n` wakes up to `n` of the oldest waiters and subtracts `n`. A wait that finds the
//! counter at zero or below after its own increment was pre-released and runs at once.

use tracing::debug;

use super::audit::AuditAction;
use super::entry::{AdmittedEntry, QueueEntry, Schedule};
use super::error::QueueError;
use super::scheduler::Scheduler;
use super::world::adjust_counter;
use super::World;
use crate::util::clock::{deadline_after, Timestamp};
use crate::util::serde::{CounterName, EntryId, ObjId};

/// The counter a wait blocks on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemaphoreWait {
    /// Object carrying the counter.
    pub target: ObjId,
    /// Counter attribute.
    pub counter: CounterName,
}

impl SemaphoreWait {
    /// Block on the default `SEMAPHORE` counter of `target`.
    #[must_use]
    pub fn on(target: ObjId) -> Self {
        Self {
            target,
            counter: CounterName::default(),
        }
    }

    /// Block on a named counter of `target`.
    #[must_use]
    pub const fn named(target: ObjId, counter: CounterName) -> Self {
        Self { target, counter }
    }
}

fn blocked_on(entry: &QueueEntry, target: ObjId, counter: &CounterName) -> bool {
    matches!(
        &entry.schedule,
        Schedule::Semaphore { target: t, counter: c, .. } if *t == target && c == counter
    )
}

impl Scheduler {
    /// Link an admitted entry into exactly one queue.
    ///
    /// Without a semaphore, a `delay` of zero or less queues for immediate execution and
    /// a positive delay waits until `now + delay`. With a semaphore, a nonzero delay is
    /// the wait's timeout.
    ///
    /// # Errors
    ///
    /// [`QueueError::PermissionDenied`] if the owner may not write the counter. The
    /// entry is then abandoned and its wait cost refunded.
    pub fn schedule<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        admitted: AdmittedEntry,
        now: Timestamp,
        delay: i64,
        semaphore: Option<SemaphoreWait>,
    ) -> Result<EntryId, QueueError> {
        let mut entry = admitted.0;
        let id = entry.id;

        let Some(SemaphoreWait { target, counter }) = semaphore else {
            if delay > 0 {
                entry.schedule = Schedule::At(deadline_after(now, delay));
                self.link_wait(entry);
            } else {
                self.link_immediate(world, entry);
            }
            return Ok(id);
        };

        if !world.can_write_counter(entry.owner, target, &counter) {
            self.abandon(world, AdmittedEntry(entry));
            return Err(QueueError::PermissionDenied);
        }

        let value = adjust_counter(world, entry.owner, target, &counter, 1);
        if value <= 0 {
            debug!(%id, %target, %counter, value, "semaphore already released");
            self.link_immediate(world, entry);
            return Ok(id);
        }

        let timeout = (delay != 0).then(|| deadline_after(now, delay));
        entry.schedule = Schedule::Semaphore {
            target,
            counter,
            timeout,
        };
        self.link_semaphore(entry);
        Ok(id)
    }

    /// Add `delta` to a counter. A negative delta first wakes up to `-delta` of the
    /// oldest entries blocked on it, if the counter is positive.
    ///
    /// Returns the number of entries woken.
    pub fn release<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        target: ObjId,
        counter: &CounterName,
        delta: i64,
    ) -> usize {
        let mut woken = 0;
        if delta < 0 && world.counter(target, counter) > 0 {
            let limit = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
            let entries = self
                .semaphore
                .drain_where(|e| blocked_on(e, target, counter), Some(limit));
            woken = entries.len();
            for entry in entries {
                self.wake(world, entry);
            }
        }
        adjust_counter(world, target, target, counter, delta);
        woken
    }

    /// Wake every entry blocked on a counter and clear it. Only a positive counter has
    /// waiters to wake; the counter is cleared regardless.
    pub fn notify_all<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        target: ObjId,
        counter: &CounterName,
    ) -> usize {
        let mut woken = 0;
        if world.counter(target, counter) > 0 {
            let entries = self
                .semaphore
                .drain_where(|e| blocked_on(e, target, counter), None);
            woken = entries.len();
            for entry in entries {
                self.wake(world, entry);
            }
        }
        world.set_counter(target, target, counter, 0);
        woken
    }

    /// Discard every entry blocked on a counter with refunds, then clear it. A counter
    /// that is not positive has no waiters, but is still cleared, dropping any banked
    /// early releases.
    pub fn drain<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        target: ObjId,
        counter: &CounterName,
    ) -> usize {
        let mut drained = 0;
        if world.counter(target, counter) > 0 {
            let entries = self
                .semaphore
                .drain_where(|e| blocked_on(e, target, counter), None);
            drained = self.discard_all(world, entries);
        }
        world.set_counter(target, target, counter, 0);
        drained
    }

    /// Move an unlinked semaphore entry to the immediate queue.
    pub(crate) fn wake<W: World + ?Sized>(&mut self, world: &W, entry: QueueEntry) {
        let id = entry.id;
        let owner = entry.owner;
        debug!(%id, %owner, "semaphore wait woken");
        self.link_immediate(world, entry);
        self.record(Some(id), owner, AuditAction::Wake, None);
    }
}
