//! In-memory world with balances, ownership, flags and counters.
//!
//! Good enough to embed the queue in a small server or to drive it from tests. Permission
//! rules are simplified: privileged principals control everything, everyone else controls
//! what they own.

use std::collections::{HashMap, HashSet};

use crate::core::World;
use crate::util::serde::{CounterName, ObjId};

#[derive(Debug, Clone, Copy)]
struct ObjectRecord {
    owner: ObjId,
    player: bool,
    going: bool,
}

/// A world held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorld {
    objects: HashMap<ObjId, ObjectRecord>,
    balances: HashMap<ObjId, u64>,
    privileged: HashSet<ObjId>,
    halters: HashSet<ObjId>,
    halted: HashSet<ObjId>,
    limits: HashMap<ObjId, u32>,
    open_counters: HashSet<ObjId>,
    counters: HashMap<(ObjId, CounterName), i64>,
    notifications: Vec<(ObjId, String)>,
}

impl InMemoryWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player owning itself, with `balance` coins.
    #[must_use]
    pub fn with_player(mut self, id: ObjId, balance: u64) -> Self {
        self.add_player(id, balance);
        self
    }

    /// Add a privileged player with `balance` coins.
    #[must_use]
    pub fn with_wizard(mut self, id: ObjId, balance: u64) -> Self {
        self.add_player(id, balance);
        self.privileged.insert(id);
        self
    }

    /// Add a non-player object owned by `owner`.
    #[must_use]
    pub fn with_object(mut self, id: ObjId, owner: ObjId) -> Self {
        self.add_object(id, owner);
        self
    }

    /// Give `principal` a quota override.
    #[must_use]
    pub fn with_queue_limit(mut self, principal: ObjId, limit: u32) -> Self {
        self.limits.insert(principal, limit);
        self
    }

    /// Let `actor` halt entries it does not control.
    #[must_use]
    pub fn with_halt_power(mut self, actor: ObjId) -> Self {
        self.halters.insert(actor);
        self
    }

    /// Let anyone block on counters of `target`.
    #[must_use]
    pub fn with_open_counters(mut self, target: ObjId) -> Self {
        self.open_counters.insert(target);
        self
    }

    /// Add a player owning itself.
    pub fn add_player(&mut self, id: ObjId, balance: u64) {
        self.objects.insert(
            id,
            ObjectRecord {
                owner: id,
                player: true,
                going: false,
            },
        );
        self.balances.insert(id, balance);
    }

    /// Add a non-player object.
    pub fn add_object(&mut self, id: ObjId, owner: ObjId) {
        self.objects.insert(
            id,
            ObjectRecord {
                owner,
                player: false,
                going: false,
            },
        );
    }

    /// Remove an object from the database.
    pub fn destroy(&mut self, id: ObjId) {
        self.objects.remove(&id);
    }

    /// Flag an object as being destroyed.
    pub fn set_going(&mut self, id: ObjId) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.going = true;
        }
    }

    /// Clear the halted flag.
    pub fn clear_halted(&mut self, id: ObjId) {
        self.halted.remove(&id);
    }

    /// Coins held by `principal`.
    #[must_use]
    pub fn balance(&self, principal: ObjId) -> u64 {
        self.balances.get(&principal).copied().unwrap_or(0)
    }

    /// Overwrite the balance of `principal`.
    pub fn set_balance(&mut self, principal: ObjId, balance: u64) {
        self.balances.insert(principal, balance);
    }

    /// Messages sent to `who`, oldest first.
    #[must_use]
    pub fn messages_for(&self, who: ObjId) -> Vec<&str> {
        self.notifications
            .iter()
            .filter(|(to, _)| *to == who)
            .map(|(_, msg)| msg.as_str())
            .collect()
    }

    /// Every message sent so far.
    #[must_use]
    pub fn notifications(&self) -> &[(ObjId, String)] {
        &self.notifications
    }
}

impl World for InMemoryWorld {
    fn owner_of(&self, obj: ObjId) -> ObjId {
        self.objects.get(&obj).map_or(obj, |o| o.owner)
    }

    fn is_valid(&self, obj: ObjId) -> bool {
        self.objects.contains_key(&obj)
    }

    fn is_going(&self, obj: ObjId) -> bool {
        self.objects.get(&obj).is_some_and(|o| o.going)
    }

    fn is_player(&self, obj: ObjId) -> bool {
        self.objects.get(&obj).is_some_and(|o| o.player)
    }

    fn is_halted(&self, obj: ObjId) -> bool {
        self.halted.contains(&obj)
    }

    fn set_halted(&mut self, obj: ObjId) {
        self.halted.insert(obj);
    }

    fn is_privileged(&self, principal: ObjId) -> bool {
        self.privileged.contains(&principal)
    }

    fn queue_limit(&self, principal: ObjId) -> Option<u32> {
        self.limits.get(&principal).copied()
    }

    fn object_count(&self) -> u32 {
        u32::try_from(self.objects.len()).unwrap_or(u32::MAX)
    }

    fn charge(&mut self, principal: ObjId, amount: u32) -> bool {
        let balance = self.balances.entry(principal).or_insert(0);
        match balance.checked_sub(u64::from(amount)) {
            Some(rest) => {
                *balance = rest;
                true
            }
            None => false,
        }
    }

    fn refund(&mut self, principal: ObjId, amount: u64) {
        let balance = self.balances.entry(principal).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    fn controls(&self, actor: ObjId, target: ObjId) -> bool {
        if !self.is_valid(actor) {
            return false;
        }
        let principal = self.owner_of(actor);
        self.is_privileged(principal) || principal == self.owner_of(target)
    }

    fn can_halt(&self, actor: ObjId) -> bool {
        self.halters.contains(&actor) || self.is_privileged(self.owner_of(actor))
    }

    fn can_write_counter(&self, actor: ObjId, target: ObjId, _counter: &CounterName) -> bool {
        self.open_counters.contains(&target) || self.controls(actor, target)
    }

    fn counter(&self, target: ObjId, counter: &CounterName) -> i64 {
        self.counters
            .get(&(target, counter.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn set_counter(&mut self, _writer: ObjId, target: ObjId, counter: &CounterName, value: i64) {
        let key = (target, counter.clone());
        if value == 0 {
            self.counters.remove(&key);
        } else {
            self.counters.insert(key, value);
        }
    }

    fn notify(&mut self, who: ObjId, message: &str) {
        self.notifications.push((who, message.to_string()));
    }
}
