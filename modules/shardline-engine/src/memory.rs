//! In-process cache adapter and recording subscriber.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{EntityRef, Resource};
use crate::events::Emission;
use crate::traits::{CacheAdapter, Subscriber};

// ---------------------------------------------------------------------------
// MemoryAdapter
// ---------------------------------------------------------------------------

/// Cache adapter backed by a map in this process. Answers immediately.
#[derive(Default)]
pub struct MemoryAdapter {
    records: RwLock<HashMap<(Resource, EntityRef), Value>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, resource: Resource, key: EntityRef) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(resource, key))
    }
}

#[async_trait]
impl CacheAdapter for MemoryAdapter {
    fn is_async(&self) -> bool {
        false
    }

    async fn get(&self, resource: Resource, key: EntityRef) -> Result<Option<Value>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(resource, key))
            .cloned())
    }

    async fn set(&self, resource: Resource, key: EntityRef, value: Value) -> Result<()> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((resource, key), value);
        Ok(())
    }

    async fn remove(&self, resource: Resource, key: EntityRef) -> Result<()> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(resource, key));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySubscriber
// ---------------------------------------------------------------------------

/// Records every emission it receives. Thread-safe.
#[derive(Default)]
pub struct MemorySubscriber {
    emissions: Mutex<Vec<Emission>>,
}

impl MemorySubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, in delivery order.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|emission| emission.name)
            .collect()
    }

    pub fn clear(&self) {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl Subscriber for MemorySubscriber {
    async fn on_event(&self, emission: &Emission) -> Result<()> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(emission.clone());
        Ok(())
    }
}
