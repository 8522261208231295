//! The scheduling queues.
//!
//! Each queue owns its entries by value, so an entry can only ever sit in one of them.
//! Moving between queues is always an explicit take-and-push.

use std::collections::VecDeque;

use super::entry::{QueueEntry, Schedule};
use super::registry::Lane;
use crate::util::clock::Timestamp;
use crate::util::serde::EntryId;

/// Remove entries matching `pred`, oldest first, up to `limit`, keeping the order of the
/// rest.
fn drain_where<F>(queue: &mut VecDeque<QueueEntry>, mut pred: F, limit: Option<usize>) -> Vec<QueueEntry>
where
    F: FnMut(&QueueEntry) -> bool,
{
    let mut taken = Vec::new();
    let mut kept = VecDeque::with_capacity(queue.len());
    for entry in queue.drain(..) {
        if limit.is_none_or(|l| taken.len() < l) && pred(&entry) {
            taken.push(entry);
        } else {
            kept.push_back(entry);
        }
    }
    *queue = kept;
    taken
}

fn take_by_id(queue: &mut VecDeque<QueueEntry>, id: EntryId) -> Option<QueueEntry> {
    let pos = queue.iter().position(|e| e.id == id)?;
    queue.remove(pos)
}

/// Ready-to-run entries in two FIFO lanes.
#[derive(Debug, Default)]
pub struct ImmediateQueue {
    player: VecDeque<QueueEntry>,
    object: VecDeque<QueueEntry>,
}

impl ImmediateQueue {
    /// Append to the tail of `lane`.
    pub fn push(&mut self, lane: Lane, entry: QueueEntry) {
        match lane {
            Lane::Player => self.player.push_back(entry),
            Lane::Object => self.object.push_back(entry),
        }
    }

    /// Pop the head of the player lane.
    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.player.pop_front()
    }

    /// Append the whole object lane to the player lane. Returns how many moved.
    pub fn promote_object_lane(&mut self) -> usize {
        let moved = self.object.len();
        self.player.append(&mut self.object);
        moved
    }

    /// Mutable access to an entry by id.
    pub fn get_mut(&mut self, lane: Lane, id: EntryId) -> Option<&mut QueueEntry> {
        self.lane_mut(lane).iter_mut().find(|e| e.id == id)
    }

    /// Every entry in both lanes, player lane first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut QueueEntry> {
        self.player.iter_mut().chain(self.object.iter_mut())
    }

    /// Entries of one lane in order.
    pub fn lane(&self, lane: Lane) -> impl Iterator<Item = &QueueEntry> {
        match lane {
            Lane::Player => self.player.iter(),
            Lane::Object => self.object.iter(),
        }
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut VecDeque<QueueEntry> {
        match lane {
            Lane::Player => &mut self.player,
            Lane::Object => &mut self.object,
        }
    }

    /// Entries in `lane`, including lazily deleted ones.
    #[must_use]
    pub fn len(&self, lane: Lane) -> usize {
        match lane {
            Lane::Player => self.player.len(),
            Lane::Object => self.object.len(),
        }
    }

    /// Whether both lanes are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.player.is_empty() && self.object.is_empty()
    }
}

/// Timed entries sorted by ascending deadline, FIFO among equal deadlines.
#[derive(Debug, Default)]
pub struct WaitQueue {
    entries: VecDeque<QueueEntry>,
}

impl WaitQueue {
    /// Insert after every entry whose deadline is equal or earlier.
    pub fn insert(&mut self, entry: QueueEntry) {
        debug_assert!(matches!(entry.schedule, Schedule::At(_)));
        let deadline = entry.schedule.deadline().unwrap_or(Timestamp::MAX);
        let pos = self
            .entries
            .iter()
            .position(|e| e.schedule.deadline().unwrap_or(Timestamp::MAX) > deadline)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
    }

    /// Pop the head if its deadline has passed.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<QueueEntry> {
        match self.entries.front()?.schedule.deadline() {
            Some(t) if t <= now => self.entries.pop_front(),
            _ => None,
        }
    }

    /// Unlink an entry by id.
    pub fn remove(&mut self, id: EntryId) -> Option<QueueEntry> {
        take_by_id(&mut self.entries, id)
    }

    /// Unlink every entry matching `pred`.
    pub fn drain_where<F: FnMut(&QueueEntry) -> bool>(&mut self, pred: F) -> Vec<QueueEntry> {
        drain_where(&mut self.entries, pred, None)
    }

    /// Shift every deadline earlier by `seconds`. Order is unchanged by a uniform shift.
    pub fn shift_earlier(&mut self, seconds: i64) {
        for entry in &mut self.entries {
            if let Schedule::At(t) = &mut entry.schedule {
                *t = t.saturating_sub(seconds);
            }
        }
    }

    /// Entries in deadline order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries blocked on a semaphore counter, in arrival order.
#[derive(Debug, Default)]
pub struct SemaphoreQueue {
    entries: VecDeque<QueueEntry>,
}

impl SemaphoreQueue {
    /// Append to the tail.
    pub fn push(&mut self, entry: QueueEntry) {
        debug_assert!(matches!(entry.schedule, Schedule::Semaphore { .. }));
        self.entries.push_back(entry);
    }

    /// Unlink an entry by id.
    pub fn remove(&mut self, id: EntryId) -> Option<QueueEntry> {
        take_by_id(&mut self.entries, id)
    }

    /// Mutable access by id.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut QueueEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Unlink up to `limit` matching entries, oldest first.
    pub fn drain_where<F: FnMut(&QueueEntry) -> bool>(
        &mut self,
        pred: F,
        limit: Option<usize>,
    ) -> Vec<QueueEntry> {
        drain_where(&mut self.entries, pred, limit)
    }

    /// Shift every timeout earlier by `seconds`.
    pub fn shift_earlier(&mut self, seconds: i64) {
        for entry in &mut self.entries {
            if let Schedule::Semaphore {
                timeout: Some(t), ..
            } = &mut entry.schedule
            {
                *t = t.saturating_sub(seconds);
            }
        }
    }

    /// Entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
