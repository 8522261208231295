//! Tests for the in-memory world

use mush_queue::core::{adjust_counter, World};
use mush_queue::infra::InMemoryWorld;
use mush_queue::util::serde::{CounterName, ObjId};

#[test]
fn test_objects_and_players() {
    let mut world = InMemoryWorld::new()
        .with_player(ObjId(1), 50)
        .with_object(ObjId(10), ObjId(1));

    assert!(world.is_player(ObjId(1)));
    assert!(!world.is_player(ObjId(10)));
    assert_eq!(world.owner_of(ObjId(10)), ObjId(1));
    assert_eq!(world.object_count(), 2);

    world.set_going(ObjId(10));
    assert!(world.is_going(ObjId(10)));
    world.destroy(ObjId(10));
    assert!(!world.is_valid(ObjId(10)));
}

#[test]
fn test_halted_flag() {
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 0);
    world.set_halted(ObjId(1));
    assert!(world.is_halted(ObjId(1)));
    world.clear_halted(ObjId(1));
    assert!(!world.is_halted(ObjId(1)));
}

#[test]
fn test_counter_permissions() {
    let world = InMemoryWorld::new()
        .with_player(ObjId(1), 0)
        .with_player(ObjId(2), 0)
        .with_object(ObjId(10), ObjId(1))
        .with_object(ObjId(20), ObjId(1))
        .with_open_counters(ObjId(20));
    let sem = CounterName::default();
    assert!(world.can_write_counter(ObjId(1), ObjId(10), &sem));
    assert!(!world.can_write_counter(ObjId(2), ObjId(10), &sem));
    assert!(world.can_write_counter(ObjId(2), ObjId(20), &sem));
}

#[test]
fn test_adjust_counter_saturates() {
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 0);
    let sem = CounterName::default();
    assert_eq!(adjust_counter(&mut world, ObjId(1), ObjId(1), &sem, 2), 2);
    assert_eq!(adjust_counter(&mut world, ObjId(1), ObjId(1), &sem, i64::MAX), i64::MAX);
    world.set_counter(ObjId(1), ObjId(1), &sem, i64::MIN + 1);
    assert_eq!(adjust_counter(&mut world, ObjId(1), ObjId(1), &sem, -5), i64::MIN);
}

#[test]
fn test_notifications_are_logged() {
    let mut world = InMemoryWorld::new().with_player(ObjId(1), 0);
    world.notify(ObjId(1), "hello");
    world.notify(ObjId(2), "other");
    assert_eq!(world.messages_for(ObjId(1)), vec!["hello"]);
    assert_eq!(world.notifications().len(), 2);
}
