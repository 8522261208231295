//! Shared utilities: clock, identifier types, telemetry.

pub mod clock;
pub mod serde;
pub mod telemetry;

pub use self::clock::*;
pub use self::serde::*;
pub use self::telemetry::*;
