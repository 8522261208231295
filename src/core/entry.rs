//! Queue entries and their packed payload.
//!
//! All variable-length data an entry carries (command text, positional arguments and the
//! register snapshot) lives in a single owned string block. Accessors hand out borrowed
//! slices into it, so an entry owns exactly one payload allocation and drops it with
//! itself.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::util::clock::Timestamp;
use crate::util::serde::{CounterName, EntryId, ObjId};

/// Positional arguments kept per entry (`%0`-`%9`). Extra arguments are dropped.
pub const MAX_ARGS: usize = 10;

/// Scratch registers captured when a command is queued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    /// Numbered registers (`%q0`..); `None` slots are unset.
    pub numbered: Vec<Option<String>>,
    /// Named registers as `(name, value)` pairs.
    pub named: Vec<(String, String)>,
}

impl RegisterSnapshot {
    /// Whether no register holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbered.iter().all(Option::is_none) && self.named.is_empty()
    }

    /// Bytes needed to store every register, or `None` on overflow.
    #[must_use]
    pub fn byte_len(&self) -> Option<usize> {
        let numbered = self
            .numbered
            .iter()
            .flatten()
            .try_fold(0usize, |acc, v| acc.checked_add(v.len()))?;
        let named = self
            .named
            .iter()
            .try_fold(0usize, |acc, (k, v)| acc.checked_add(k.len())?.checked_add(v.len()))?;
        numbered.checked_add(named)
    }
}

/// Total payload size with overflow-checked accumulation.
pub(crate) fn payload_size<S: AsRef<str>>(
    command: &str,
    args: &[S],
    registers: &RegisterSnapshot,
) -> Option<usize> {
    let args = args
        .iter()
        .take(MAX_ARGS)
        .try_fold(0usize, |acc, a| acc.checked_add(a.as_ref().len()))?;
    command.len().checked_add(args)?.checked_add(registers.byte_len()?)
}

/// Single allocation holding every string an entry carries.
#[derive(Debug)]
pub(crate) struct PayloadBlock {
    block: Box<str>,
    command: Range<usize>,
    args: Vec<Range<usize>>,
    numbered: Vec<Option<Range<usize>>>,
    named: Vec<(Range<usize>, Range<usize>)>,
}

impl PayloadBlock {
    /// Pack the payload. `size` must come from [`payload_size`].
    pub(crate) fn pack<S: AsRef<str>>(
        size: usize,
        command: &str,
        args: &[S],
        registers: &RegisterSnapshot,
    ) -> Self {
        let mut buf = String::with_capacity(size);
        let mut push = |s: &str| {
            let start = buf.len();
            buf.push_str(s);
            start..buf.len()
        };

        let command = push(command);
        let args = args.iter().take(MAX_ARGS).map(|a| push(a.as_ref())).collect();
        let numbered = registers
            .numbered
            .iter()
            .map(|r| r.as_deref().map(&mut push))
            .collect();
        let named = registers
            .named
            .iter()
            .map(|(k, v)| (push(k), push(v)))
            .collect();

        Self {
            block: buf.into_boxed_str(),
            command,
            args,
            numbered,
            named,
        }
    }

    fn slice(&self, span: &Range<usize>) -> &str {
        &self.block[span.clone()]
    }

    pub(crate) fn len(&self) -> usize {
        self.block.len()
    }
}

/// When an entry becomes runnable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Runnable at the next service point.
    Ready,
    /// Runnable once the clock reaches the deadline.
    At(Timestamp),
    /// Blocked until `counter` on `target` is released, or the optional timeout passes.
    Semaphore {
        /// Object carrying the counter.
        target: ObjId,
        /// Counter attribute.
        counter: CounterName,
        /// Deadline after which the wait gives up and runs anyway.
        timeout: Option<Timestamp>,
    },
}

impl Schedule {
    /// Deadline of a timed wait or a semaphore timeout.
    #[must_use]
    pub const fn deadline(&self) -> Option<Timestamp> {
        match self {
            Self::Ready => None,
            Self::At(t) => Some(*t),
            Self::Semaphore { timeout, .. } => *timeout,
        }
    }
}

/// Lifecycle tag of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryState {
    /// Live and eligible to run.
    Active,
    /// Halted in place in the immediate queue; the consumer discards it when popped.
    PendingReap,
    /// Taken out of every queue and the registry.
    Removed,
}

/// One deferred command.
#[derive(Debug)]
pub struct QueueEntry {
    pub(crate) id: EntryId,
    pub(crate) owner: ObjId,
    pub(crate) principal: ObjId,
    pub(crate) cause: ObjId,
    pub(crate) payload: PayloadBlock,
    pub(crate) wait_cost: u32,
    pub(crate) surcharge: u32,
    pub(crate) schedule: Schedule,
    pub(crate) state: EntryState,
}

impl QueueEntry {
    /// Identifier, unique among live entries.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Acting object, or [`ObjId::NOTHING`] once halted.
    #[must_use]
    pub const fn owner(&self) -> ObjId {
        self.owner
    }

    /// Principal charged for this entry at admission.
    #[must_use]
    pub const fn principal(&self) -> ObjId {
        self.principal
    }

    /// Object the command's side effects are attributed to.
    #[must_use]
    pub const fn cause(&self) -> ObjId {
        self.cause
    }

    /// Command text.
    #[must_use]
    pub fn command(&self) -> &str {
        self.payload.slice(&self.payload.command)
    }

    /// Positional arguments, in order.
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        self.payload.args.iter().map(|s| self.payload.slice(s)).collect()
    }

    /// A single positional argument.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.payload.args.get(index).map(|s| self.payload.slice(s))
    }

    /// Rebuild the register snapshot captured at admission.
    #[must_use]
    pub fn registers(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            numbered: self
                .payload
                .numbered
                .iter()
                .map(|r| r.as_ref().map(|s| self.payload.slice(s).to_string()))
                .collect(),
            named: self
                .payload
                .named
                .iter()
                .map(|(k, v)| (self.payload.slice(k).to_string(), self.payload.slice(v).to_string()))
                .collect(),
        }
    }

    /// Named register lookup, case-insensitive on the name.
    #[must_use]
    pub fn named_register(&self, name: &str) -> Option<&str> {
        self.payload
            .named
            .iter()
            .find(|(k, _)| self.payload.slice(k).eq_ignore_ascii_case(name))
            .map(|(_, v)| self.payload.slice(v))
    }

    /// Bytes held by the payload block.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Base wait cost charged at admission; refunded on cancel or execution.
    #[must_use]
    pub const fn wait_cost(&self) -> u32 {
        self.wait_cost
    }

    /// Random machine-cost surcharge charged at admission; never refunded.
    #[must_use]
    pub const fn surcharge(&self) -> u32 {
        self.surcharge
    }

    /// Current schedule.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Lifecycle tag.
    #[must_use]
    pub const fn state(&self) -> EntryState {
        self.state
    }

    /// Whether the entry is live and not halted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == EntryState::Active && !self.owner.is_nothing()
    }

    /// Halt in place: the entry stays linked but will never run.
    pub(crate) fn mark_reaped(&mut self) {
        self.owner = ObjId::NOTHING;
        self.state = EntryState::PendingReap;
    }
}

/// An entry that passed admission control and holds a registered identifier but is not
/// yet linked into any queue. Hand it to [`crate::core::Scheduler::schedule`].
#[derive(Debug)]
#[must_use = "an admitted entry holds an identifier until it is scheduled or abandoned"]
pub struct AdmittedEntry(pub(crate) QueueEntry);

impl AdmittedEntry {
    /// Identifier assigned at admission.
    pub const fn id(&self) -> EntryId {
        self.0.id
    }

    /// Read-only view of the entry.
    pub const fn entry(&self) -> &QueueEntry {
        &self.0
    }
}
