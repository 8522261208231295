//! Tests for configuration validation

use std::collections::HashMap;

use mush_queue::config::{ConfigError, QueueConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = QueueConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.wait_cost, 10);
    assert_eq!(cfg.machine_cost, 64);
    assert_eq!(cfg.queue_max, 100);
    assert_eq!(cfg.max_ids, 10_000);
    assert_eq!(cfg.service_ceiling_secs, 1000);
}

#[test]
fn test_config_invalid_max_ids() {
    let invalid = QueueConfig {
        max_ids: 0,
        ..QueueConfig::default()
    };
    assert!(matches!(invalid.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_invalid_chunks() {
    let invalid = QueueConfig {
        queue_chunk: 0,
        ..QueueConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_ceiling() {
    let invalid = QueueConfig {
        service_ceiling_secs: 0,
        ..QueueConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_fills_defaults() {
    let cfg = QueueConfig::from_json_str(r#"{"wait_cost": 3, "queue_max": 5}"#).unwrap();
    assert_eq!(cfg.wait_cost, 3);
    assert_eq!(cfg.queue_max, 5);
    assert_eq!(cfg.max_ids, 10_000);
    assert!(cfg.dequeue_enabled);
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(matches!(
        QueueConfig::from_json_str("{not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        QueueConfig::from_json_str(r#"{"max_ids": 0}"#),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_from_lookup_overrides() {
    let cfg = QueueConfig::from_lookup(lookup(&[
        ("MUSH_QUEUE_WAIT_COST", "25"),
        ("MUSH_QUEUE_DEQUEUE_ENABLED", "false"),
        ("MUSH_QUEUE_MAX_IDS", " 500 "),
    ]))
    .unwrap();
    assert_eq!(cfg.wait_cost, 25);
    assert!(!cfg.dequeue_enabled);
    assert_eq!(cfg.max_ids, 500);
    assert_eq!(cfg.queue_max, 100);
}

#[test]
fn test_from_lookup_reports_bad_value() {
    let err = QueueConfig::from_lookup(lookup(&[("MUSH_QUEUE_QUEUE_MAX", "many")])).unwrap_err();
    match err {
        ConfigError::Env { key, value } => {
            assert_eq!(key, "MUSH_QUEUE_QUEUE_MAX");
            assert_eq!(value, "many");
        }
        other => panic!("unexpected error: {other}"),
    }
}
