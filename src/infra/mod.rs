//! Infrastructure adapters: world backends the queue can run against.

pub mod world;

pub use world::InMemoryWorld;
