//! The dispatch router.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shardline_structures::Client;
use tracing::debug;

use crate::events::{DomainEvent, Emission, RawEvent};
use crate::handlers;
use crate::session::Session;
use crate::traits::{RawHandler, Transform};

/// What runs for one wire event name.
#[derive(Clone)]
pub enum Handler {
    /// Emits through the dispatch context; may emit nothing.
    Imperative(Arc<dyn RawHandler>),
    /// Returns one event, emitted under the transform's name.
    Functional(Arc<dyn Transform>),
}

impl Handler {
    pub fn imperative<H: RawHandler + 'static>(handler: H) -> Self {
        Self::Imperative(Arc::new(handler))
    }

    pub fn functional<T: Transform + 'static>(transform: T) -> Self {
        Self::Functional(Arc::new(transform))
    }

    /// Functional handler from a plain synchronous transform.
    pub fn map<F>(event: &'static str, transform: F) -> Self
    where
        F: Fn(&Session, &Value) -> Result<DomainEvent> + Send + Sync + 'static,
    {
        Self::functional(MapTransform { event, transform })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imperative(_) => f.write_str("Handler::Imperative"),
            Self::Functional(transform) => write!(f, "Handler::Functional({})", transform.event()),
        }
    }
}

struct MapTransform<F> {
    event: &'static str,
    transform: F,
}

#[async_trait]
impl<F> Transform for MapTransform<F>
where
    F: Fn(&Session, &Value) -> Result<DomainEvent> + Send + Sync,
{
    fn event(&self) -> &'static str {
        self.event
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        (self.transform)(session, payload).map(Some)
    }
}

/// Per-dispatch state handed to imperative handlers.
pub struct DispatchContext<'a> {
    session: &'a Session,
    shard_id: u32,
    emissions: Vec<Emission>,
}

impl<'a> DispatchContext<'a> {
    fn new(session: &'a Session, shard_id: u32) -> Self {
        Self {
            session,
            shard_id,
            emissions: Vec::new(),
        }
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Queue an event for delivery under its catalogue name.
    pub fn emit(&mut self, event: DomainEvent) {
        self.emit_as(event.name(), event);
    }

    fn emit_as(&mut self, name: &'static str, event: DomainEvent) {
        self.emissions.push(Emission::new(name, self.shard_id, event));
    }
}

/// Maps wire event names to handlers and serializes dispatch per shard.
pub struct Router {
    handlers: HashMap<String, Handler>,
    lanes: Mutex<HashMap<u32, Arc<tokio::sync::Mutex<()>>>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// A router with a handler for every catalogue event.
    pub fn with_default_handlers() -> Self {
        let mut router = Self::new();
        handlers::register_defaults(&mut router);
        router
    }

    /// Install `handler` for `event_name`, returning the one it replaced.
    pub fn register(&mut self, event_name: impl Into<String>, handler: Handler) -> Option<Handler> {
        self.handlers.insert(event_name.into(), handler)
    }

    pub fn handler(&self, event_name: &str) -> Option<&Handler> {
        self.handlers.get(event_name)
    }

    fn lane(&self, shard_id: u32) -> Arc<tokio::sync::Mutex<()>> {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(shard_id)
            .or_default()
            .clone()
    }

    /// Normalize one wire event and deliver the result.
    ///
    /// The catch-all `raw` emission always goes first, then whatever the
    /// handler produced. Events on the same shard are fully processed
    /// (handler and every subscriber) one at a time. Returns the number of
    /// emissions delivered; never fails.
    pub async fn dispatch(
        &self,
        session: &Session,
        event_name: &str,
        shard_id: u32,
        payload: Value,
    ) -> usize {
        let lane = self.lane(shard_id);
        let _held = lane.lock().await;

        if !session.is_alive() {
            debug!(event = event_name, shard_id, "Session gone, dropping dispatch");
            return 0;
        }

        let payload = Arc::new(payload);
        let mut ctx = DispatchContext::new(session, shard_id);
        ctx.emit(DomainEvent::Raw(RawEvent {
            event: event_name.to_string(),
            payload: Arc::clone(&payload),
        }));

        match self.handlers.get(event_name) {
            Some(Handler::Imperative(handler)) => {
                let before = ctx.emissions.len();
                if let Err(e) = handler.handle(&mut ctx, &payload) {
                    ctx.emissions.truncate(before);
                    debug!(event = event_name, shard_id, error = %e, "Handler failed, skipping");
                }
            }
            Some(Handler::Functional(transform)) => {
                match transform.transform(session, shard_id, &payload).await {
                    Ok(Some(event)) => ctx.emit_as(transform.event(), event),
                    Ok(None) => debug!(event = event_name, shard_id, "Transform skipped"),
                    Err(e) => {
                        debug!(event = event_name, shard_id, error = %e, "Transform failed, skipping")
                    }
                }
            }
            None => debug!(event = event_name, shard_id, "No handler registered"),
        }

        let mut delivered = 0;
        for emission in &ctx.emissions {
            if !session.is_alive() {
                debug!(event = emission.name, shard_id, "Session gone mid-dispatch");
                break;
            }
            session.deliver(emission).await;
            delivered += 1;
        }
        delivered
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
