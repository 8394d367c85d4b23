use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use shardline_common::Snowflake;
use shardline_structures::{
    build_each, decode, required_snowflake, snowflake_field, Channel, GuildChannel, ThreadChannel,
    ThreadMember,
};
use tracing::debug;

use crate::engine::{DispatchContext, Handler, Router};
use crate::events::{names, DomainEvent, ThreadListSync};
use crate::traits::RawHandler;

/// DM channels have no guild and produce no delete event.
fn channel_delete(ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
    let Some(guild_id) = snowflake_field(payload, "guild_id")? else {
        debug!(shard_id = ctx.shard_id(), "Channel delete without guild, skipping");
        return Ok(());
    };

    let channel = GuildChannel::from_raw(payload, guild_id, ctx.session().handle())?;
    ctx.emit(DomainEvent::ChannelDelete(channel));
    Ok(())
}

/// Thread create, update and delete share one shape.
struct ThreadEvent {
    wrap: fn(ThreadChannel) -> DomainEvent,
}

impl RawHandler for ThreadEvent {
    fn handle(&self, ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
        let Some(guild_id) = snowflake_field(payload, "guild_id")? else {
            debug!(shard_id = ctx.shard_id(), "Thread event without guild, skipping");
            return Ok(());
        };

        let thread = ThreadChannel::from_raw(payload, guild_id, ctx.session().handle())?;
        ctx.emit((self.wrap)(thread));
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSyncRecord {
    #[serde(default)]
    channel_ids: Vec<Snowflake>,
}

pub(super) fn register(router: &mut Router) {
    router.register(
        "CHANNEL_CREATE",
        Handler::map(names::CHANNEL_CREATE, |session, payload| {
            Ok(DomainEvent::ChannelCreate(Channel::from_raw(payload, session.handle())?))
        }),
    );
    router.register(
        "CHANNEL_UPDATE",
        Handler::map(names::CHANNEL_UPDATE, |session, payload| {
            Ok(DomainEvent::ChannelUpdate(Channel::from_raw(payload, session.handle())?))
        }),
    );
    router.register("CHANNEL_DELETE", Handler::imperative(channel_delete));
    router.register(
        "CHANNEL_PINS_UPDATE",
        Handler::map(names::CHANNEL_PINS_UPDATE, |_, payload| {
            Ok(DomainEvent::ChannelPinsUpdate(decode("channel pins update", payload)?))
        }),
    );

    router.register(
        "THREAD_CREATE",
        Handler::imperative(ThreadEvent {
            wrap: DomainEvent::ThreadCreate,
        }),
    );
    router.register(
        "THREAD_UPDATE",
        Handler::imperative(ThreadEvent {
            wrap: DomainEvent::ThreadUpdate,
        }),
    );
    router.register(
        "THREAD_DELETE",
        Handler::imperative(ThreadEvent {
            wrap: DomainEvent::ThreadDelete,
        }),
    );

    // Threads and members arrive without a guild id of their own.
    router.register(
        "THREAD_LIST_SYNC",
        Handler::map(names::THREAD_LIST_SYNC, |session, payload| {
            let guild_id = required_snowflake(payload, "guild_id")?;
            let record: ListSyncRecord = decode("thread list sync", payload)?;

            let threads = build_each(payload, "threads", guild_id, |raw| {
                ThreadChannel::from_raw(raw, guild_id, session.handle())
            });
            let members = build_each(payload, "members", guild_id, ThreadMember::from_raw);

            Ok(DomainEvent::ThreadListSync(ThreadListSync {
                guild_id,
                channel_ids: record.channel_ids,
                threads,
                members,
            }))
        }),
    );
}
