//! World backends.

pub mod memory;

pub use memory::InMemoryWorld;
