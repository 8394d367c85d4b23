//! Time-bounded membership set.
//!
//! Tracks ids awaiting a follow-up action (interactions awaiting a reply).
//! Each id moves absent → registered → (cleared | expired) → absent. The live
//! set and the expiry bookkeeping share one mutex, and every registration
//! carries a generation so an expiry timer can only remove the registration
//! that scheduled it.
//!
//! Re-registering a live id is a no-op: the original expiry stands and no
//! second timer is spawned. An entry whose window has passed counts as
//! absent even if its timer has not run yet (or never will, outside a
//! runtime): registering it again replaces it under a new generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use shardline_common::Snowflake;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

struct Registration {
    registered_at: Instant,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct TrackerState {
    live: HashMap<Snowflake, Registration>,
    next_generation: u64,
}

pub struct RegistrationTracker {
    window: Duration,
    state: Arc<Mutex<TrackerState>>,
}

fn lock(state: &Mutex<TrackerState>) -> MutexGuard<'_, TrackerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RegistrationTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start tracking `id`. Returns `false` if it is still inside its window.
    ///
    /// An expired entry is replaced and its pending timer aborted. Outside a
    /// tokio runtime no timer is scheduled; the entry still reads as expired
    /// once the window has passed, and registering sweeps expired entries.
    pub fn register(&self, id: Snowflake) -> bool {
        let runtime = tokio::runtime::Handle::try_current().ok();
        let window = self.window;
        let mut state = lock(&self.state);
        if let Some(existing) = state.live.get(&id) {
            if existing.registered_at.elapsed() < self.window {
                return false;
            }
        }
        if let Some(stale) = state.live.remove(&id) {
            if let Some(expiry) = stale.expiry {
                expiry.abort();
            }
            debug!(%id, "Replacing expired registration");
        }
        if runtime.is_none() {
            state
                .live
                .retain(|_, r| r.registered_at.elapsed() < window);
        }

        let generation = state.next_generation;
        state.next_generation += 1;

        let expiry = runtime.map(|runtime| {
            runtime.spawn(expire(
                Arc::downgrade(&self.state),
                id,
                generation,
                window,
            ))
        });

        state.live.insert(
            id,
            Registration {
                registered_at: Instant::now(),
                generation,
                expiry,
            },
        );
        true
    }

    pub fn is_registered(&self, id: Snowflake) -> bool {
        lock(&self.state)
            .live
            .get(&id)
            .is_some_and(|r| r.registered_at.elapsed() < self.window)
    }

    /// Stop tracking `id`. Returns `false` if it was not tracked or its
    /// window had already passed.
    pub fn clear(&self, id: Snowflake) -> bool {
        let removed = lock(&self.state).live.remove(&id);
        match removed {
            Some(registration) => {
                if let Some(expiry) = registration.expiry {
                    expiry.abort();
                }
                registration.registered_at.elapsed() < self.window
            }
            None => false,
        }
    }

    /// Ids still inside their window.
    pub fn len(&self) -> usize {
        lock(&self.state)
            .live
            .values()
            .filter(|r| r.registered_at.elapsed() < self.window)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration and cancel every pending timer.
    pub fn shutdown(&self) {
        let drained: Vec<Registration> =
            lock(&self.state).live.drain().map(|(_, r)| r).collect();
        let cancelled = drained.len();
        for registration in drained {
            if let Some(expiry) = registration.expiry {
                expiry.abort();
            }
        }
        if cancelled > 0 {
            debug!(cancelled, "Registration timers cancelled");
        }
    }
}

impl Drop for RegistrationTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn expire(
    state: Weak<Mutex<TrackerState>>,
    id: Snowflake,
    generation: u64,
    window: Duration,
) {
    tokio::time::sleep(window).await;

    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = lock(&state);
    if state
        .live
        .get(&id)
        .is_some_and(|r| r.generation == generation)
    {
        state.live.remove(&id);
        debug!(%id, "Registration expired");
    }
}
