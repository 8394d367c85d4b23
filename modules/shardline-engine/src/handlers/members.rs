use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shardline_common::Snowflake;
use shardline_structures::{build_each, decode, required_snowflake, Member};

use super::user_id;
use crate::cache::EntityRef;
use crate::diff::{resolve_removal, resolve_update};
use crate::engine::{Handler, Router};
use crate::events::{names, DomainEvent, MembersChunk};
use crate::session::Session;
use crate::traits::Transform;

struct MemberUpdate;

#[async_trait]
impl Transform for MemberUpdate {
    fn event(&self) -> &'static str {
        names::GUILD_MEMBER_UPDATE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let guild_id = required_snowflake(payload, "guild_id")?;
        let key = EntityRef::in_container(user_id(payload)?, guild_id);

        let diff = resolve_update(session.cache(), key, session.handle(), || {
            Member::from_raw(payload, guild_id, session.handle())
        })
        .await?;
        Ok(Some(DomainEvent::GuildMemberUpdate(diff)))
    }
}

struct MemberRemove;

#[async_trait]
impl Transform for MemberRemove {
    fn event(&self) -> &'static str {
        names::GUILD_MEMBER_REMOVE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let guild_id = required_snowflake(payload, "guild_id")?;
        let key = EntityRef::in_container(user_id(payload)?, guild_id);

        let removed =
            resolve_removal::<Member>(session.cache(), key, payload, session.handle()).await;
        Ok(Some(DomainEvent::GuildMemberRemove(removed)))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkRecord {
    guild_id: Snowflake,
    #[serde(default)]
    chunk_index: u32,
    #[serde(default)]
    chunk_count: u32,
    #[serde(default)]
    not_found: Vec<Snowflake>,
    #[serde(default)]
    nonce: Option<String>,
}

pub(super) fn register(router: &mut Router) {
    router.register(
        "GUILD_MEMBER_ADD",
        Handler::map(names::GUILD_MEMBER_ADD, |session, payload| {
            let guild_id = required_snowflake(payload, "guild_id")?;
            let member = Member::from_raw(payload, guild_id, session.handle())?;
            Ok(DomainEvent::GuildMemberAdd(member))
        }),
    );
    router.register("GUILD_MEMBER_UPDATE", Handler::functional(MemberUpdate));
    router.register("GUILD_MEMBER_REMOVE", Handler::functional(MemberRemove));

    router.register(
        "GUILD_MEMBERS_CHUNK",
        Handler::map(names::GUILD_MEMBERS_CHUNK, |session, payload| {
            let chunk: ChunkRecord = decode("members chunk", payload)?;
            let members = build_each(payload, "members", chunk.guild_id, |raw| {
                Member::from_raw(raw, chunk.guild_id, session.handle())
            });

            Ok(DomainEvent::GuildMembersChunk(MembersChunk {
                guild_id: chunk.guild_id,
                members,
                chunk_index: chunk.chunk_index,
                chunk_count: chunk.chunk_count,
                not_found: chunk.not_found,
                nonce: chunk.nonce,
            }))
        }),
    );
}
