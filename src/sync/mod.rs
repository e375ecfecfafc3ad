//! Synchronization engine
//!
//! - `scheduler` drives periodic and event-triggered pulls.
//! - `mutation` applies optimistic writes with rollback on failure.
//! - `derived` recomputes remotely-derived values on governing transitions.

pub mod derived;
pub mod mutation;
pub mod scheduler;

pub use derived::ThresholdEngine;
pub use mutation::MutationPipeline;
pub use scheduler::{EntityKind, SyncScheduler};
