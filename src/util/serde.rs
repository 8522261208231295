//! Serializable identifier types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::QueueError;

/// Reference to an object in the world database (`#123`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjId(pub i64);

impl ObjId {
    /// The "no object" sentinel. A queue entry whose owner is `NOTHING` has been halted.
    pub const NOTHING: Self = Self(-1);

    /// Whether this is the `NOTHING` sentinel or any other negative reference.
    #[must_use]
    pub const fn is_nothing(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a live queue entry, in `1..=max_ids`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl EntryId {
    /// Parse user-supplied text, rejecting anything outside `1..=max_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidId`] for non-numeric or out-of-range input.
    pub fn parse_bounded(text: &str, max_ids: u32) -> Result<Self, QueueError> {
        let id: Self = text.trim().parse()?;
        if id.0 > max_ids {
            return Err(QueueError::InvalidId);
        }
        Ok(id)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for EntryId {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(v) if v >= 1 => u32::try_from(v).map(Self).map_err(|_| QueueError::InvalidId),
            _ => Err(QueueError::InvalidId),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of the counter attribute a semaphore wait blocks on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterName(String);

impl CounterName {
    /// Attribute used when a wait does not name one.
    pub const DEFAULT: &'static str = "SEMAPHORE";

    /// Build a counter name; attribute names are case-insensitive and stored upper-case.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_ascii_uppercase())
    }

    /// Whether this is the default `SEMAPHORE` counter.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// The attribute name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CounterName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
