//! Tests for builder modules

use mush_queue::builders::{build_scheduler, SchedulerBuilder};
use mush_queue::config::QueueConfig;
use mush_queue::core::{AuditAction, NoSurcharge, QueueRequest, Scheduler, SharedAuditSink};
use mush_queue::infra::InMemoryWorld;
use mush_queue::util::serde::ObjId;

#[test]
fn test_build_scheduler_defaults() {
    let scheduler = build_scheduler(&QueueConfig::default()).unwrap();
    assert_eq!(scheduler.config().wait_cost, 10);
    assert_eq!(scheduler.live(), 0);
    assert!(scheduler.dequeue_enabled());
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let cfg = QueueConfig {
        queue_max: 0,
        ..QueueConfig::default()
    };
    assert!(build_scheduler(&cfg).is_err());
}

#[test]
fn test_try_new_validates_config() {
    for cfg in [
        QueueConfig {
            max_ids: 0,
            ..QueueConfig::default()
        },
        QueueConfig {
            service_ceiling_secs: 0,
            ..QueueConfig::default()
        },
    ] {
        assert!(Scheduler::try_new(cfg.clone()).is_err());
        assert!(build_scheduler(&cfg).is_err());
    }
    assert!(Scheduler::try_new(QueueConfig::default()).is_ok());
}

#[test]
fn test_unvalidated_ceiling_never_yields_negative_sleep() {
    let scheduler = Scheduler::new(QueueConfig {
        service_ceiling_secs: 0,
        ..QueueConfig::default()
    });
    assert_eq!(scheduler.next_service_in(0), 0);
}

#[test]
fn test_builder_wires_audit_and_surcharge() {
    let audit = SharedAuditSink::new();
    let builder = SchedulerBuilder::new(QueueConfig::default())
        .audit(audit.clone())
        .surcharge(NoSurcharge);
    assert_eq!(builder.config().machine_cost, 64);
    let mut scheduler = builder.build().unwrap();

    let mut world = InMemoryWorld::new().with_player(ObjId(1), 100);
    scheduler
        .submit(&mut world, &QueueRequest::new(ObjId(1), ObjId(1), "look"), 0)
        .unwrap();

    assert_eq!(world.balance(ObjId(1)), 90);
    assert_eq!(audit.actions(), vec![AuditAction::Admit]);
}

#[test]
fn test_seeded_builds_are_reproducible() {
    let charges = |seed| {
        let mut scheduler = SchedulerBuilder::new(QueueConfig {
            machine_cost: 4,
            ..QueueConfig::default()
        })
        .seed(seed)
        .build()
        .unwrap();
        let mut world = InMemoryWorld::new().with_player(ObjId(1), 10_000);
        (0..50)
            .map(|_| {
                let id = scheduler
                    .submit(&mut world, &QueueRequest::new(ObjId(1), ObjId(1), "x"), 0)
                    .unwrap();
                scheduler.entry(id).unwrap().surcharge()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(charges(11), charges(11));
}
