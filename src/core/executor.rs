//! Command execution trait.

use super::{QueueEntry, Scheduler, World};

/// Runs a dequeued command.
///
/// The executor receives the scheduler back so that the command it runs can queue more
/// work (`@wait`, `@trigger`, ...). The entry has already left every queue and the
/// registry when `execute` is called.
///
/// # Example
///
/// ```rust,ignore
/// use mush_queue::core::{CommandExecutor, QueueEntry, Scheduler, World};
///
/// struct Echo(Vec<String>);
///
/// impl<W: World> CommandExecutor<W> for Echo {
///     fn execute(&mut self, _queue: &mut Scheduler, _world: &mut W, entry: &QueueEntry) {
///         self.0.push(entry.command().to_string());
///     }
/// }
/// ```
pub trait CommandExecutor<W: World> {
    /// Execute `entry`'s command as its owner, attributed to its cause.
    fn execute(&mut self, queue: &mut Scheduler, world: &mut W, entry: &QueueEntry);
}

impl<W, F> CommandExecutor<W> for F
where
    W: World,
    F: FnMut(&mut Scheduler, &mut W, &QueueEntry),
{
    fn execute(&mut self, queue: &mut Scheduler, world: &mut W, entry: &QueueEntry) {
        self(queue, world, entry);
    }
}
