//! Tests for audit sink

use mush_queue::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, SharedAuditSink};
use mush_queue::util::serde::{EntryId, ObjId};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        Some(EntryId(1)),
        ObjId(3),
        AuditAction::Admit,
        Some("say hi".to_string()),
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].entry_id, Some(EntryId(1)));
    assert_eq!(events[0].action, AuditAction::Admit);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(Some(EntryId(1)), ObjId(1), AuditAction::Admit, None));
    sink.record(build_audit_event(Some(EntryId(2)), ObjId(1), AuditAction::Admit, None));
    sink.record(build_audit_event(Some(EntryId(3)), ObjId(1), AuditAction::Execute, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].entry_id, Some(EntryId(2))); // First one popped
    assert_eq!(events[1].action, AuditAction::Execute);
}

#[test]
fn test_zero_capacity_sink_drops_everything() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(None, ObjId(1), AuditAction::Refuse, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        None,
        ObjId(9),
        AuditAction::Runaway,
        Some("limit 100".to_string()),
    );

    assert_eq!(event.entry_id, None);
    assert_eq!(event.actor, ObjId(9));
    assert_eq!(event.detail.as_deref(), Some("limit 100"));
    assert!(event.created_at_ms > 0);
    assert!(uuid::Uuid::parse_str(&event.event_id).is_ok());
}

#[test]
fn test_shared_sink_keeps_handle() {
    let shared = SharedAuditSink::new();
    let mut boxed: Box<dyn AuditSink> = Box::new(shared.clone());
    boxed.record(build_audit_event(None, ObjId(1), AuditAction::Cancel, None));
    assert_eq!(shared.actions(), vec![AuditAction::Cancel]);
}

#[test]
fn test_action_serializes_snake_case() {
    let json = serde_json::to_string(&AuditAction::CancelId).unwrap();
    assert_eq!(json, "\"cancel_id\"");
}
