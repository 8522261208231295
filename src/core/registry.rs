//! Identifier registry: allocation and lookup of live entry identifiers.

use std::collections::HashMap;

use crate::util::serde::EntryId;

/// Which queue currently owns an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Admitted but not yet scheduled.
    Admitted,
    /// Immediate queue, in the given lane.
    Immediate(Lane),
    /// Deadline-ordered wait queue.
    Wait,
    /// Semaphore queue.
    Semaphore,
}

/// Immediate queue lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Work caused by players; popped by the service loop.
    Player,
    /// Work caused by objects; promoted to the player lane once per tick.
    Object,
}

/// Maps each live identifier to the queue holding its entry.
///
/// Allocation is next-fit: the cursor moves past the last id handed out and wraps at
/// `max_ids`, so a freed id is not reused until the cursor comes back around.
#[derive(Debug)]
pub struct IdentifierRegistry {
    live: HashMap<EntryId, Location>,
    cursor: u32,
    max_ids: u32,
}

impl IdentifierRegistry {
    /// Create a registry handing out ids in `1..=max_ids`.
    #[must_use]
    pub fn new(max_ids: u32) -> Self {
        Self {
            live: HashMap::new(),
            cursor: 1,
            max_ids,
        }
    }

    /// Find a free identifier without registering it. `None` when every id is live.
    #[must_use]
    pub fn allocate(&mut self) -> Option<EntryId> {
        let mut candidate = self.cursor;
        for _ in 0..self.max_ids {
            if candidate == 0 || candidate > self.max_ids {
                candidate = 1;
            }
            let id = EntryId(candidate);
            if !self.live.contains_key(&id) {
                self.cursor = candidate.wrapping_add(1);
                return Some(id);
            }
            candidate = candidate.wrapping_add(1);
        }
        None
    }

    /// Register `id` at `location`.
    pub fn insert(&mut self, id: EntryId, location: Location) {
        let previous = self.live.insert(id, location);
        debug_assert!(previous.is_none(), "identifier {id} registered twice");
    }

    /// Record that `id` moved to `location`.
    pub fn relocate(&mut self, id: EntryId, location: Location) {
        if let Some(slot) = self.live.get_mut(&id) {
            *slot = location;
        }
    }

    /// Where `id` lives, if it is live.
    #[must_use]
    pub fn locate(&self, id: EntryId) -> Option<Location> {
        self.live.get(&id).copied()
    }

    /// Drop the mapping for `id`. Returns false if it was not live.
    pub fn release(&mut self, id: EntryId) -> bool {
        self.live.remove(&id).is_some()
    }

    /// Number of live identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no identifier is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Upper bound of the identifier space.
    #[must_use]
    pub const fn max_ids(&self) -> u32 {
        self.max_ids
    }

    /// Iterate live identifiers and their locations.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, Location)> + '_ {
        self.live.iter().map(|(id, loc)| (*id, *loc))
    }
}
