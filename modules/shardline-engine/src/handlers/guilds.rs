use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shardline_common::to_camel_case;
use shardline_structures::{build_each, required_snowflake, Emoji, Guild, Role, Sticker, User};

use super::nested;
use crate::cache::EntityRef;
use crate::diff::{resolve_removal, resolve_update};
use crate::engine::{Handler, Router};
use crate::events::{
    names, DomainEvent, GuildBan, GuildEmojisUpdate, GuildStickersUpdate, Removed,
};
use crate::session::Session;
use crate::traits::Transform;

// ---------------------------------------------------------------------------
// Guilds
// ---------------------------------------------------------------------------

struct GuildUpdate;

#[async_trait]
impl Transform for GuildUpdate {
    fn event(&self) -> &'static str {
        names::GUILD_UPDATE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let key = EntityRef::new(required_snowflake(payload, "id")?);
        let diff = resolve_update(session.cache(), key, session.handle(), || {
            Guild::from_raw(payload, session.handle())
        })
        .await?;
        Ok(Some(DomainEvent::GuildUpdate(diff)))
    }
}

/// Removal or outage. Without a cached copy the `{id, unavailable}` stub is
/// emitted. On an outage the cached copy comes back marked `unavailable`.
struct GuildDelete;

#[async_trait]
impl Transform for GuildDelete {
    fn event(&self) -> &'static str {
        names::GUILD_DELETE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let key = EntityRef::new(required_snowflake(payload, "id")?);
        let mut removed =
            resolve_removal::<Guild>(session.cache(), key, payload, session.handle()).await;
        let outage = payload
            .get("unavailable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Removed::Cached(guild) = &mut removed {
            guild.unavailable = outage;
        }
        Ok(Some(DomainEvent::GuildDelete(removed)))
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

struct RoleUpdate;

#[async_trait]
impl Transform for RoleUpdate {
    fn event(&self) -> &'static str {
        names::GUILD_ROLE_UPDATE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let guild_id = required_snowflake(payload, "guild_id")?;
        let role = nested(payload, "role")?;
        let key = EntityRef::new(required_snowflake(role, "id")?);

        let diff = resolve_update(session.cache(), key, session.handle(), || {
            Role::from_raw(role, guild_id, session.handle())
        })
        .await?;
        Ok(Some(DomainEvent::GuildRoleUpdate(diff)))
    }
}

/// The delete payload only names the role, so the cached copy is the only
/// source of its permissions.
struct RoleDelete;

#[async_trait]
impl Transform for RoleDelete {
    fn event(&self) -> &'static str {
        names::GUILD_ROLE_DELETE
    }

    async fn transform(
        &self,
        session: &Session,
        _shard_id: u32,
        payload: &Value,
    ) -> Result<Option<DomainEvent>> {
        let key = EntityRef::new(required_snowflake(payload, "role_id")?);
        let removed =
            resolve_removal::<Role>(session.cache(), key, payload, session.handle()).await;
        Ok(Some(DomainEvent::GuildRoleDelete(removed)))
    }
}

fn ban(session: &Session, payload: &Value) -> Result<GuildBan> {
    Ok(GuildBan {
        guild_id: required_snowflake(payload, "guild_id")?,
        user: User::from_raw(nested(payload, "user")?, session.handle())?,
    })
}

/// Events forwarded as their normalized record.
const PASSTHROUGH: &[(&str, &str, fn(Value) -> DomainEvent)] = &[
    (
        "GUILD_AUDIT_LOG_ENTRY_CREATE",
        names::GUILD_AUDIT_LOG_ENTRY_CREATE,
        DomainEvent::GuildAuditLogEntryCreate,
    ),
    (
        "GUILD_INTEGRATIONS_UPDATE",
        names::GUILD_INTEGRATIONS_UPDATE,
        DomainEvent::GuildIntegrationsUpdate,
    ),
    (
        "GUILD_SCHEDULED_EVENT_CREATE",
        names::GUILD_SCHEDULED_EVENT_CREATE,
        DomainEvent::GuildScheduledEventCreate,
    ),
    (
        "GUILD_SCHEDULED_EVENT_UPDATE",
        names::GUILD_SCHEDULED_EVENT_UPDATE,
        DomainEvent::GuildScheduledEventUpdate,
    ),
    (
        "GUILD_SCHEDULED_EVENT_DELETE",
        names::GUILD_SCHEDULED_EVENT_DELETE,
        DomainEvent::GuildScheduledEventDelete,
    ),
    (
        "GUILD_SCHEDULED_EVENT_USER_ADD",
        names::GUILD_SCHEDULED_EVENT_USER_ADD,
        DomainEvent::GuildScheduledEventUserAdd,
    ),
    (
        "GUILD_SCHEDULED_EVENT_USER_REMOVE",
        names::GUILD_SCHEDULED_EVENT_USER_REMOVE,
        DomainEvent::GuildScheduledEventUserRemove,
    ),
];

pub(super) fn register(router: &mut Router) {
    router.register(
        "GUILD_CREATE",
        Handler::map(names::GUILD_CREATE, |session, payload| {
            Ok(DomainEvent::GuildCreate(Guild::from_raw(payload, session.handle())?))
        }),
    );
    router.register("GUILD_UPDATE", Handler::functional(GuildUpdate));
    router.register("GUILD_DELETE", Handler::functional(GuildDelete));

    router.register(
        "GUILD_BAN_ADD",
        Handler::map(names::GUILD_BAN_ADD, |session, payload| {
            Ok(DomainEvent::GuildBanAdd(ban(session, payload)?))
        }),
    );
    router.register(
        "GUILD_BAN_REMOVE",
        Handler::map(names::GUILD_BAN_REMOVE, |session, payload| {
            Ok(DomainEvent::GuildBanRemove(ban(session, payload)?))
        }),
    );

    router.register(
        "GUILD_EMOJIS_UPDATE",
        Handler::map(names::GUILD_EMOJIS_UPDATE, |session, payload| {
            let guild_id = required_snowflake(payload, "guild_id")?;
            let emojis = build_each(payload, "emojis", guild_id, |raw| {
                Emoji::from_raw(raw, guild_id, session.handle())
            });
            Ok(DomainEvent::GuildEmojisUpdate(GuildEmojisUpdate { guild_id, emojis }))
        }),
    );
    router.register(
        "GUILD_STICKERS_UPDATE",
        Handler::map(names::GUILD_STICKERS_UPDATE, |session, payload| {
            let guild_id = required_snowflake(payload, "guild_id")?;
            let stickers = build_each(payload, "stickers", guild_id, |raw| {
                Sticker::from_raw(raw, session.handle())
            });
            Ok(DomainEvent::GuildStickersUpdate(GuildStickersUpdate { guild_id, stickers }))
        }),
    );

    router.register(
        "GUILD_ROLE_CREATE",
        Handler::map(names::GUILD_ROLE_CREATE, |session, payload| {
            let guild_id = required_snowflake(payload, "guild_id")?;
            let role = Role::from_raw(nested(payload, "role")?, guild_id, session.handle())?;
            Ok(DomainEvent::GuildRoleCreate(role))
        }),
    );
    router.register("GUILD_ROLE_UPDATE", Handler::functional(RoleUpdate));
    router.register("GUILD_ROLE_DELETE", Handler::functional(RoleDelete));

    for &(wire, event, wrap) in PASSTHROUGH {
        router.register(
            wire,
            Handler::map(event, move |_, payload| Ok(wrap(to_camel_case(payload)))),
        );
    }
}
