use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use shardline_structures::{decode, User};
use tracing::info;

use super::nested;
use crate::engine::{DispatchContext, Handler, Router};
use crate::events::{DomainEvent, Ready, ReadyApplication, UnavailableGuild};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadyRecord {
    v: u8,
    session_id: String,
    #[serde(default)]
    resume_gateway_url: Option<String>,
    application: ReadyApplication,
    #[serde(default)]
    guilds: Vec<UnavailableGuild>,
    #[serde(default)]
    shard: Option<[u32; 2]>,
}

/// Records the session identity before anything is emitted.
fn ready(ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
    let record: ReadyRecord = decode("ready", payload)?;
    let session = ctx.session();
    let user = User::from_raw(nested(payload, "user")?, session.handle())?;

    session.set_identity(record.application.id, user.id);
    info!(
        shard_id = ctx.shard_id(),
        bot_id = %user.id,
        guilds = record.guilds.len(),
        "Shard ready"
    );

    ctx.emit(DomainEvent::Ready(Ready {
        v: record.v,
        user,
        session_id: record.session_id,
        resume_gateway_url: record.resume_gateway_url,
        application: record.application,
        guilds: record.guilds,
        shard: record.shard,
    }));
    Ok(())
}

pub(super) fn register(router: &mut Router) {
    router.register("READY", Handler::imperative(ready));
}
