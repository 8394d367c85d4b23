//! Gateway event normalization and dispatch.
//!
//! A transport hands over `(event name, shard id, payload)` tuples. The
//! `Router` looks up the handler for the name, the handler normalizes the
//! payload into a `DomainEvent` (consulting the cache for update/remove
//! kinds), and the result is delivered to the session's subscribers together
//! with a catch-all `raw` emission. Dispatch is serialized per shard.

pub mod cache;
pub mod diff;
pub mod engine;
pub mod events;
mod handlers;
pub mod memory;
pub mod pipeline;
pub mod session;
pub mod tracker;
pub mod traits;

#[cfg(test)]
mod tracker_tests;

pub use cache::{Cache, CacheWriter, Cached, EntityRef, Resource};
pub use diff::{resolve_removal, resolve_update};
pub use engine::{DispatchContext, Handler, Router};
pub use events::{names, Diff, DomainEvent, Emission, PartialEntity, Removed};
pub use memory::{MemoryAdapter, MemorySubscriber};
pub use pipeline::{ShardPipeline, WireEvent};
pub use session::Session;
pub use tracker::RegistrationTracker;
pub use traits::{CacheAdapter, RawHandler, Subscriber, Transform};
