//! Runtime driver and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod driver;

pub use api::{health, list_queue, submit_request, Health, SubmitResponse};
#[cfg(feature = "tokio-runtime")]
pub use driver::{QueueDriver, ServiceReport};
