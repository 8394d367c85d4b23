//! Per-shard queues in front of the router.
//!
//! A transport calls `submit` from wherever frames arrive; each shard gets
//! one worker that dispatches its events strictly in submission order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use shardline_common::{Result, ShardlineError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::Router;
use crate::session::Session;

/// One gateway dispatch frame, tagged with the shard it arrived on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "t")]
    pub name: String,
    #[serde(rename = "shard", default)]
    pub shard_id: u32,
    #[serde(rename = "d", default)]
    pub payload: Value,
}

impl WireEvent {
    pub fn new(name: impl Into<String>, shard_id: u32, payload: Value) -> Self {
        Self {
            name: name.into(),
            shard_id,
            payload,
        }
    }
}

struct Lane {
    tx: mpsc::UnboundedSender<WireEvent>,
    worker: JoinHandle<()>,
}

pub struct ShardPipeline {
    router: Arc<Router>,
    session: Arc<Session>,
    lanes: Mutex<Option<HashMap<u32, Lane>>>,
}

impl ShardPipeline {
    pub fn new(router: Arc<Router>, session: Arc<Session>) -> Self {
        Self {
            router,
            session,
            lanes: Mutex::new(Some(HashMap::new())),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Queue an event behind everything already submitted for its shard.
    pub fn submit(&self, event: WireEvent) -> Result<()> {
        let mut guard = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        let lanes = guard.as_mut().ok_or(ShardlineError::PipelineClosed)?;
        let lane = lanes
            .entry(event.shard_id)
            .or_insert_with(|| self.spawn_lane(event.shard_id));
        lane.tx
            .send(event)
            .map_err(|_| ShardlineError::PipelineClosed)
    }

    fn spawn_lane(&self, shard_id: u32) -> Lane {
        let (tx, mut rx) = mpsc::unbounded_channel::<WireEvent>();
        let router = Arc::clone(&self.router);
        let session = Arc::clone(&self.session);

        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                router
                    .dispatch(&session, &event.name, event.shard_id, event.payload)
                    .await;
            }
            debug!(shard_id, "Shard worker drained");
        });

        debug!(shard_id, "Shard worker started");
        Lane { tx, worker }
    }

    /// Stop accepting events, let queued ones finish, then tear down the session.
    pub async fn shutdown(&self) {
        let lanes = self
            .lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(lanes) = lanes {
            let workers: Vec<JoinHandle<()>> = lanes
                .into_values()
                .map(|Lane { tx, worker }| {
                    drop(tx);
                    worker
                })
                .collect();
            let count = workers.len();

            for result in join_all(workers).await {
                if let Err(e) = result {
                    warn!(error = %e, "Shard worker ended abnormally");
                }
            }
            info!(shards = count, "Pipeline drained");
        }

        self.session.shutdown();
    }
}
