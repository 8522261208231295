//! Tests for utility functions

use mush_queue::util::clock::{deadline_after, now_ms, now_secs, Timestamp};
use mush_queue::util::serde::{CounterName, EntryId, ObjId};
use mush_queue::util::telemetry::{init_tracing, DEFAULT_FILTER};

#[test]
fn test_obj_id_display_and_nothing() {
    assert_eq!(ObjId(42).to_string(), "#42");
    assert!(ObjId::NOTHING.is_nothing());
    assert!(!ObjId(0).is_nothing());
}

#[test]
fn test_entry_id_parse() {
    assert_eq!("12".parse::<EntryId>().unwrap().get(), 12);
    assert!("0".parse::<EntryId>().is_err());
    assert!("x1".parse::<EntryId>().is_err());
    assert!(EntryId::parse_bounded(" 7 ", 10).is_ok());
    assert!(EntryId::parse_bounded("11", 10).is_err());
}

#[test]
fn test_entry_id_serializes_as_number() {
    assert_eq!(serde_json::to_string(&EntryId(5)).unwrap(), "5");
    assert_eq!(serde_json::to_string(&ObjId(-1)).unwrap(), "-1");
}

#[test]
fn test_counter_name() {
    assert_eq!(CounterName::default().as_str(), CounterName::DEFAULT);
    assert_eq!(CounterName::new("Gate").to_string(), "GATE");
}

#[test]
fn test_clock() {
    assert!(now_secs() > 1_600_000_000);
    assert!(now_ms() > 1_600_000_000_000);
    assert_eq!(deadline_after(Timestamp::MAX - 1, 10), Timestamp::MAX);
}

#[test]
fn test_init_tracing_is_idempotent() {
    assert_eq!(DEFAULT_FILTER, "mush_queue=info");
    init_tracing();
    init_tracing();
}
