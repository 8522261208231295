//! Periodic service: promoting due work, running the head of the queue, and reporting.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::audit::AuditAction;
use super::cancel::Selector;
use super::entry::{EntryState, QueueEntry, Schedule};
use super::executor::CommandExecutor;
use super::registry::{Lane, Location};
use super::scheduler::Scheduler;
use super::world::adjust_counter;
use super::World;
use crate::util::clock::Timestamp;
use crate::util::serde::{CounterName, EntryId, ObjId};

/// Counts from one [`Scheduler::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Object-lane entries moved to the player lane.
    pub promoted: usize,
    /// Wait entries whose deadline passed.
    pub due: usize,
    /// Semaphore waits that timed out.
    pub timed_out: usize,
}

impl TickReport {
    /// Total entries moved.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.promoted + self.due + self.timed_out
    }
}

/// One entry as shown in a queue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    /// Identifier.
    pub id: EntryId,
    /// Acting object.
    pub owner: ObjId,
    /// Cause.
    pub cause: ObjId,
    /// Command text.
    pub command: String,
    /// Positional arguments.
    pub args: Vec<String>,
    /// Seconds until the deadline, for timed entries.
    pub remaining: Option<i64>,
    /// Semaphore target, for blocked entries.
    pub target: Option<ObjId>,
    /// Semaphore counter, when it is not the default one.
    pub counter: Option<CounterName>,
}

impl EntrySummary {
    fn of(entry: &QueueEntry, now: Timestamp) -> Self {
        let (target, counter) = match &entry.schedule {
            Schedule::Semaphore {
                target, counter, ..
            } => (Some(*target), (!counter.is_default()).then(|| counter.clone())),
            _ => (None, None),
        };
        Self {
            id: entry.id,
            owner: entry.owner,
            cause: entry.cause,
            command: entry.command().to_string(),
            args: entry.args().into_iter().map(str::to_string).collect(),
            remaining: entry.schedule.deadline().map(|t| t.saturating_sub(now)),
            target,
            counter,
        }
    }
}

/// Listing of one queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSection {
    /// Entries matching the selector.
    pub entries: Vec<EntrySummary>,
    /// Entries in the queue, matching or not.
    pub total: usize,
    /// Entries halted in place and awaiting reaping.
    pub deleted: usize,
}

impl QueueSection {
    fn collect<'a>(
        entries: impl Iterator<Item = &'a QueueEntry>,
        selector: &Selector,
        now: Timestamp,
    ) -> Self {
        let mut section = Self::default();
        for entry in entries {
            section.total += 1;
            if entry.state == EntryState::PendingReap {
                section.deleted += 1;
            } else if selector.matches(entry) {
                section.entries.push(EntrySummary::of(entry, now));
            }
        }
        section
    }
}

/// Snapshot of every queue, as printed by `@ps`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueListing {
    /// Player lane of the immediate queue.
    pub player: QueueSection,
    /// Object lane of the immediate queue.
    pub object: QueueSection,
    /// Wait queue.
    pub wait: QueueSection,
    /// Semaphore queue.
    pub semaphore: QueueSection,
}

impl Scheduler {
    /// Once-per-second service step: promote the object lane, then move due waits and
    /// timed-out semaphore waits to the immediate queue.
    ///
    /// Does nothing while dequeueing is disabled.
    pub fn tick<W: World + ?Sized>(&mut self, world: &mut W, now: Timestamp) -> TickReport {
        let mut report = TickReport::default();
        if !self.dequeue_enabled {
            return report;
        }

        // Promote before waking, so object-caused wakes wait for the next tick.
        let moved: Vec<EntryId> = self.immediate.lane(Lane::Object).map(|e| e.id).collect();
        report.promoted = self.immediate.promote_object_lane();
        for id in moved {
            self.registry.relocate(id, Location::Immediate(Lane::Player));
        }

        while let Some(entry) = self.wait.pop_due(now) {
            report.due += 1;
            self.link_immediate(world, entry);
        }

        let expired = self.semaphore.drain_where(
            |e| matches!(e.schedule, Schedule::Semaphore { timeout: Some(t), .. } if t <= now),
            None,
        );
        report.timed_out = expired.len();
        for entry in expired {
            if let Schedule::Semaphore {
                target, counter, ..
            } = &entry.schedule
            {
                adjust_counter(world, entry.owner, *target, counter, -1);
            }
            self.wake(world, entry);
        }

        if report.total() > 0 {
            debug!(
                promoted = report.promoted,
                due = report.due,
                timed_out = report.timed_out,
                "queue tick"
            );
        }
        report
    }

    /// Pop and run up to `max` entries from the player lane. Returns how many were
    /// popped, including halted ones that were discarded.
    ///
    /// Each entry leaves the registry before the executor sees it. Its wait cost is
    /// refunded whether or not it runs, unless its owner was destroyed; the quota slot
    /// is freed either way.
    pub fn run_top<W, E>(&mut self, world: &mut W, executor: &mut E, max: usize) -> usize
    where
        W: World,
        E: CommandExecutor<W> + ?Sized,
    {
        if !self.dequeue_enabled {
            return 0;
        }
        let mut popped = 0;
        while popped < max {
            let Some(entry) = self.immediate.pop_front() else {
                break;
            };
            popped += 1;
            let reaped = entry.state == EntryState::PendingReap;
            let entry = self.destroy(entry);
            if reaped {
                debug!(id = %entry.id, "discarding halted queue entry");
                continue;
            }
            if !world.is_valid(entry.owner) || world.is_going(entry.owner) {
                // no refund for a vanished owner, but the quota slot is freed
                debug!(id = %entry.id, owner = %entry.owner, "discarding entry of destroyed owner");
                self.release_outstanding(entry.principal, 1);
                continue;
            }

            world.refund(entry.principal, u64::from(entry.wait_cost));
            self.release_outstanding(entry.principal, 1);
            if world.is_halted(entry.owner) {
                debug!(id = %entry.id, owner = %entry.owner, "owner halted, not running");
                continue;
            }

            debug!(id = %entry.id, owner = %entry.owner, command = entry.command(), "running queued command");
            self.record(Some(entry.id), entry.owner, AuditAction::Execute, None);
            executor.execute(self, world, &entry);
        }
        popped
    }

    /// Seconds the server may sleep before the queue next needs service.
    #[must_use]
    pub fn next_service_in(&self, now: Timestamp) -> i64 {
        if self.immediate.len(Lane::Player) > 0 {
            return 0;
        }
        if self.immediate.len(Lane::Object) > 0 {
            return 1;
        }

        let mut min = self.config.service_ceiling_secs;
        let deadlines = self
            .wait
            .iter()
            .chain(self.semaphore.iter())
            .filter_map(|e| e.schedule.deadline());
        for deadline in deadlines {
            let until = deadline.saturating_sub(now);
            if until <= 2 {
                return 1;
            }
            min = min.min(until);
        }
        (min - 1).max(0)
    }

    /// Move every wait deadline and semaphore timeout `seconds` earlier, then tick.
    pub fn warp<W: World + ?Sized>(&mut self, world: &mut W, seconds: i64, now: Timestamp) -> TickReport {
        self.wait.shift_earlier(seconds);
        self.semaphore.shift_earlier(seconds);
        self.tick(world, now)
    }

    /// Snapshot the queues, keeping entries that match `selector`.
    #[must_use]
    pub fn listing(&self, selector: &Selector, now: Timestamp) -> QueueListing {
        QueueListing {
            player: QueueSection::collect(self.immediate.lane(Lane::Player), selector, now),
            object: QueueSection::collect(self.immediate.lane(Lane::Object), selector, now),
            wait: QueueSection::collect(self.wait.iter(), selector, now),
            semaphore: QueueSection::collect(self.semaphore.iter(), selector, now),
        }
    }
}
