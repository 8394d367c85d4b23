//! Core traits for the dispatch engine.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{EntityRef, Resource};
use crate::engine::DispatchContext;
use crate::events::{DomainEvent, Emission};
use crate::session::Session;

/// Receives emitted domain events.
///
/// Called once per emission, in emission order, while the emitting shard is
/// still held. Errors are logged and never reach the transport.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn on_event(&self, emission: &Emission) -> Result<()>;
}

/// Imperative handler: emits zero or more events through the context itself.
///
/// Used where one wire event fans out to a variable number of domain events,
/// or where emission depends on a field being present.
pub trait RawHandler: Send + Sync {
    fn handle(&self, ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()>;
}

impl<F> RawHandler for F
where
    F: Fn(&mut DispatchContext<'_>, &Value) -> Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
        self(ctx, payload)
    }
}

/// Functional handler: returns a value the router emits under `event()`.
///
/// `Ok(None)` skips emission on purpose; `Err` is treated as missing data
/// and also skips.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Domain event name the result is emitted under.
    fn event(&self) -> &'static str;

    async fn transform(
        &self,
        session: &Session,
        shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>>;
}

/// Storage behind the entity cache. Records are normalized (camelCase) JSON.
///
/// The contract is uniformly async even for adapters that answer
/// immediately; `is_async` is informational.
#[async_trait]
pub trait CacheAdapter: Send + Sync {
    fn is_async(&self) -> bool;

    async fn get(&self, resource: Resource, key: EntityRef) -> Result<Option<Value>>;

    async fn set(&self, resource: Resource, key: EntityRef, value: Value) -> Result<()>;

    async fn remove(&self, resource: Resource, key: EntityRef) -> Result<()>;
}
