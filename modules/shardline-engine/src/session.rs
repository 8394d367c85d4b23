//! Session: identity, cache, unreplied interactions and subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use shardline_common::{Config, Snowflake};
use shardline_structures::{Client, ClientHandle};
use tracing::{info, warn};

use crate::cache::Cache;
use crate::events::Emission;
use crate::tracker::RegistrationTracker;
use crate::traits::{CacheAdapter, Subscriber};

#[derive(Debug, Clone, Copy, Default)]
struct Identity {
    application_id: Option<Snowflake>,
    bot_id: Option<Snowflake>,
}

#[derive(Default)]
struct Subscribers {
    by_event: HashMap<String, Vec<Arc<dyn Subscriber>>>,
    any: Vec<Arc<dyn Subscriber>>,
}

pub struct Session {
    config: Config,
    identity: RwLock<Identity>,
    cache: Cache,
    unreplied_interactions: RegistrationTracker,
    subscribers: RwLock<Subscribers>,
    alive: AtomicBool,
    handle: ClientHandle,
}

impl Session {
    pub fn new(config: Config, adapter: Arc<dyn CacheAdapter>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            unreplied_interactions: RegistrationTracker::new(config.interaction_window),
            config,
            identity: RwLock::new(Identity::default()),
            cache: Cache::new(adapter),
            subscribers: RwLock::new(Subscribers::default()),
            alive: AtomicBool::new(true),
            handle: ClientHandle::from_weak(weak.clone()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Back-reference handed to every structure this session builds.
    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// Interaction ids that have not been answered yet.
    pub fn unreplied_interactions(&self) -> &RegistrationTracker {
        &self.unreplied_interactions
    }

    pub fn set_identity(&self, application_id: Snowflake, bot_id: Snowflake) {
        let mut identity = self.identity.write().unwrap_or_else(PoisonError::into_inner);
        identity.application_id = Some(application_id);
        identity.bot_id = Some(bot_id);
    }

    /// Subscribe to one domain event name.
    pub fn on(&self, event: impl Into<String>, subscriber: Arc<dyn Subscriber>) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .by_event
            .entry(event.into())
            .or_default()
            .push(subscriber);
    }

    /// Subscribe to every emission, `raw` included.
    pub fn on_any(&self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .any
            .push(subscriber);
    }

    /// Deliver one emission to its subscribers, in registration order.
    ///
    /// Catch-all subscribers run first so cache writers registered with
    /// `on_any` have applied the event before named subscribers see it.
    pub(crate) async fn deliver(&self, emission: &Emission) {
        let targets: Vec<Arc<dyn Subscriber>> = {
            let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
            subscribers
                .any
                .iter()
                .chain(subscribers.by_event.get(emission.name).into_iter().flatten())
                .cloned()
                .collect()
        };

        for subscriber in targets {
            if let Err(e) = subscriber.on_event(emission).await {
                warn!(
                    event = emission.name,
                    shard_id = emission.shard_id,
                    error = %e,
                    "Subscriber failed"
                );
            }
        }
    }

    /// Tear the session down: pending registration timers are cancelled and
    /// later dispatches are dropped.
    pub fn shutdown(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            self.unreplied_interactions.shutdown();
            info!("Session shut down");
        }
    }
}

impl Client for Session {
    fn application_id(&self) -> Option<Snowflake> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .application_id
    }

    fn bot_id(&self) -> Option<Snowflake> {
        self.identity.read().unwrap_or_else(PoisonError::into_inner).bot_id
    }

    fn total_shards(&self) -> u32 {
        self.config.total_shards
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
