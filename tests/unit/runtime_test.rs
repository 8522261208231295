//! Tests for the runtime API surface

use mush_queue::config::QueueConfig;
use mush_queue::core::{NoSurcharge, QueueRequest, Scheduler, Selector};
use mush_queue::infra::InMemoryWorld;
use mush_queue::runtime::{health, list_queue, submit_request};
use mush_queue::util::serde::ObjId;

fn scheduler(max_ids: u32) -> Scheduler {
    Scheduler::new(QueueConfig {
        max_ids,
        ..QueueConfig::default()
    })
    .with_surcharge(Box::new(NoSurcharge))
}

#[test]
fn test_submit_request_success_and_refusal() {
    let mut queue = scheduler(10);
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 15);

    let ok = submit_request(&mut queue, &mut world, &QueueRequest::new(ObjId(1), ObjId(1), "look"), 0);
    assert!(ok.id.is_some());
    assert!(ok.error.is_none());

    let refused = submit_request(&mut queue, &mut world, &QueueRequest::new(ObjId(1), ObjId(1), "look"), 0);
    assert_eq!(refused.id, None);
    assert_eq!(refused.error.as_deref(), Some("not enough money to queue command"));
}

#[test]
fn test_health_reports_capacity() {
    let mut queue = scheduler(1);
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 100);
    assert!(health(&queue).ok);

    queue
        .submit(&mut world, &QueueRequest::new(ObjId(1), ObjId(1), "look"), 0)
        .unwrap();
    let h = health(&queue);
    assert!(!h.ok);
    assert_eq!((h.live, h.capacity), (1, 1));

    queue.set_dequeue_enabled(false);
    assert!(!health(&queue).dequeue_enabled);
}

#[test]
fn test_list_queue_serializes() {
    let mut queue = scheduler(10);
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 100);
    queue
        .submit(&mut world, &QueueRequest::new(ObjId(1), ObjId(1), "think").after(30), 100)
        .unwrap();

    let listing = list_queue(&queue, &Selector::all(), 110);
    assert_eq!(listing.wait.total, 1);
    assert_eq!(listing.wait.entries[0].remaining, Some(20));

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["wait"]["entries"][0]["command"], "think");
}
