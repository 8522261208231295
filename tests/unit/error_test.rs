//! Tests for error types

use mush_queue::config::ConfigError;
use mush_queue::core::{AppResult, QueueError};
use mush_queue::util::serde::ObjId;

#[test]
fn test_insufficient_funds_error() {
    let err = QueueError::InsufficientFunds;
    assert_eq!(format!("{}", err), "not enough money to queue command");
}

#[test]
fn test_quota_exceeded_error() {
    let err = QueueError::QuotaExceeded {
        owner: ObjId(7),
        limit: 100,
    };
    assert_eq!(
        format!("{}", err),
        "run away objects: #7 exceeded queue limit of 100"
    );
}

#[test]
fn test_payload_too_large_error() {
    let err = QueueError::PayloadTooLarge { limit: 64 };
    assert_eq!(format!("{}", err), "payload too large to queue (limit 64 bytes)");
}

#[test]
fn test_pid_errors() {
    assert_eq!(
        QueueError::InvalidId.to_string(),
        "that PID is not associated with an active queue entry"
    );
    assert_eq!(
        QueueError::NoTimeout.to_string(),
        "that semaphore does not have a wait time"
    );
}

#[test]
fn test_app_result_wraps_queue_errors() {
    fn admit() -> AppResult<()> {
        Err(QueueError::IdentifierExhausted)?;
        Ok(())
    }
    let err = admit().unwrap_err();
    assert_eq!(err.to_string(), "the queue is full");
    assert_eq!(
        err.downcast_ref::<QueueError>(),
        Some(&QueueError::IdentifierExhausted)
    );
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::Env {
        key: "MUSH_QUEUE_WAIT_COST".to_string(),
        value: "lots".to_string(),
    };
    assert_eq!(format!("{}", err), "invalid value for MUSH_QUEUE_WAIT_COST: lots");
}
