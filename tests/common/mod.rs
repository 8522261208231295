//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use mush_queue::config::QueueConfig;
use mush_queue::core::{CommandExecutor, NoSurcharge, QueueEntry, Scheduler, SharedAuditSink};
use mush_queue::infra::InMemoryWorld;
use mush_queue::util::clock::Timestamp;
use mush_queue::util::serde::ObjId;

/// Player with plenty of money.
pub const ALICE: ObjId = ObjId(1);
/// Second, unrelated player.
pub const BOB: ObjId = ObjId(2);
/// Privileged player.
pub const WIZARD: ObjId = ObjId(3);
/// Thing owned by `ALICE`.
pub const GADGET: ObjId = ObjId(10);

pub const START_BALANCE: u64 = 1000;
pub const NOW: Timestamp = 1_000_000;

pub fn world() -> InMemoryWorld {
    InMemoryWorld::new()
        .with_player(ALICE, START_BALANCE)
        .with_player(BOB, START_BALANCE)
        .with_wizard(WIZARD, START_BALANCE)
        .with_object(GADGET, ALICE)
}

pub fn config() -> QueueConfig {
    QueueConfig {
        queue_max: 3,
        max_ids: 50,
        ..QueueConfig::default()
    }
}

pub fn scheduler(config: QueueConfig) -> Scheduler {
    Scheduler::new(config).with_surcharge(Box::new(NoSurcharge))
}

pub fn audited(config: QueueConfig) -> (Scheduler, SharedAuditSink) {
    let audit = SharedAuditSink::new();
    let queue = scheduler(config).with_audit(Box::new(audit.clone()));
    (queue, audit)
}

/// Executor recording what it ran.
#[derive(Debug, Default)]
pub struct Recorder {
    pub ran: Vec<(ObjId, String, Vec<String>)>,
}

impl Recorder {
    pub fn commands(&self) -> Vec<&str> {
        self.ran.iter().map(|(_, cmd, _)| cmd.as_str()).collect()
    }
}

impl CommandExecutor<InMemoryWorld> for Recorder {
    fn execute(&mut self, _queue: &mut Scheduler, _world: &mut InMemoryWorld, entry: &QueueEntry) {
        self.ran.push((
            entry.owner(),
            entry.command().to_string(),
            entry.args().into_iter().map(str::to_string).collect(),
        ));
    }
}
