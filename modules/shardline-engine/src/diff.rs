//! Previous-state resolution for update and removal events.
//!
//! The cache is always consulted through its async contract. A miss (or a
//! failing adapter) is a normal outcome: updates report no old value and
//! removals fall back to a stand-in built from the payload.

use serde_json::Value;
use shardline_common::Result;
use shardline_structures::ClientHandle;

use crate::cache::{Cache, Cached, EntityRef};
use crate::events::{Diff, PartialEntity, Removed};

/// Pair freshly built state with whatever the cache held for `key`.
///
/// `build` runs whatever the cache returns; its error (missing data in the
/// payload) is the only failure.
pub async fn resolve_update<T, F>(
    cache: &Cache,
    key: EntityRef,
    client: &ClientHandle,
    build: F,
) -> Result<Diff<T>>
where
    T: Cached,
    F: FnOnce() -> Result<T>,
{
    let old = cache.get::<T>(key, client).await;
    let new = build()?;
    Ok(Diff { new, old })
}

/// The cached entity for `key`, or a partial stand-in from `raw`.
pub async fn resolve_removal<T: Cached>(
    cache: &Cache,
    key: EntityRef,
    raw: &Value,
    client: &ClientHandle,
) -> Removed<T> {
    match cache.get::<T>(key, client).await {
        Some(cached) => Removed::Cached(cached),
        None => Removed::Partial(PartialEntity::from_raw(raw, client)),
    }
}
