//! The collaborator interface the queue consumes: object database, permissions and
//! accounting.
//!
//! The scheduler never owns world state. Everything it needs to know about objects,
//! money, privileges and semaphore counters goes through this trait, so the same queue
//! code runs against a real database or against [`crate::infra::InMemoryWorld`].

use crate::util::serde::{CounterName, ObjId};

/// Object database, permission model and accounting as seen by the queue.
pub trait World {
    /// The principal (owning player) of `obj`. Quotas and refunds are kept per principal.
    fn owner_of(&self, obj: ObjId) -> ObjId;

    /// Whether `obj` refers to an existing object.
    fn is_valid(&self, obj: ObjId) -> bool;

    /// Whether `obj` is being destroyed. Commands for such objects are discarded.
    fn is_going(&self, _obj: ObjId) -> bool {
        false
    }

    /// Whether `obj` is a player. Player-caused work skips the object lane.
    fn is_player(&self, obj: ObjId) -> bool;

    /// Whether `obj` has been halted and may not queue or run commands.
    fn is_halted(&self, obj: ObjId) -> bool;

    /// Mark `obj` halted.
    fn set_halted(&mut self, obj: ObjId);

    /// Whether `principal` gets the large, database-sized queue quota.
    fn is_privileged(&self, principal: ObjId) -> bool;

    /// Per-principal quota override, if one has been set.
    fn queue_limit(&self, _principal: ObjId) -> Option<u32> {
        None
    }

    /// Number of objects in the database.
    fn object_count(&self) -> u32;

    /// Deduct `amount` from `principal`. Returns false if the balance is insufficient.
    fn charge(&mut self, principal: ObjId, amount: u32) -> bool;

    /// Credit `amount` back to `principal`.
    fn refund(&mut self, principal: ObjId, amount: u64);

    /// Whether `actor` controls `target`.
    fn controls(&self, actor: ObjId, target: ObjId) -> bool;

    /// Whether `actor` may halt entries it does not control.
    fn can_halt(&self, actor: ObjId) -> bool;

    /// Whether `actor` may block on, and therefore write, `counter` on `target`.
    fn can_write_counter(&self, actor: ObjId, target: ObjId, counter: &CounterName) -> bool;

    /// Current value of a semaphore counter; unset or unparsable counters read as zero.
    fn counter(&self, target: ObjId, counter: &CounterName) -> i64;

    /// Store a semaphore counter. Writing zero clears it. `writer` is the object
    /// responsible for the change.
    fn set_counter(&mut self, writer: ObjId, target: ObjId, counter: &CounterName, value: i64);

    /// Send a message to `who`.
    fn notify(&mut self, who: ObjId, message: &str);
}

/// Add `delta` to a counter with saturating arithmetic and return the new value.
pub fn adjust_counter<W: World + ?Sized>(
    world: &mut W,
    writer: ObjId,
    target: ObjId,
    counter: &CounterName,
    delta: i64,
) -> i64 {
    let value = world.counter(target, counter).saturating_add(delta);
    world.set_counter(writer, target, counter, value);
    value
}
