//! Wall-clock helpers.
//!
//! Queue deadlines are whole seconds since the Unix epoch, matching the granularity the
//! per-second service tick works at. Audit records use milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch. Deadlines are stored in this unit.
pub type Timestamp = i64;

/// Current time in seconds since the Unix epoch.
#[must_use]
pub fn now_secs() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| Timestamp::try_from(d.as_secs()).unwrap_or(Timestamp::MAX))
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

/// `now + delay`, clamped to the representable range instead of wrapping.
///
/// A huge positive delay lands on `Timestamp::MAX`, never in the past.
#[must_use]
pub const fn deadline_after(now: Timestamp, delay: i64) -> Timestamp {
    now.saturating_add(delay)
}
