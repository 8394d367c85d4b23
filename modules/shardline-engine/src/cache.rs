//! Entity cache facade.
//!
//! Storage is delegated to a `CacheAdapter`; this module decides keys,
//! rebuilds structures from stored records, and turns adapter failures into
//! misses. Nothing here retries.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shardline_common::{ShardlineError, Snowflake};
use shardline_structures::{snowflake_field, Channel, ClientHandle, Guild, Member, Role};
use tracing::{debug, warn};

use crate::events::{Diff, DomainEvent, Emission, Removed};
use crate::traits::{CacheAdapter, Subscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Guilds,
    Members,
    Roles,
    Channels,
}

/// Cache key: entity id plus the id of the container it lives in, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub id: Snowflake,
    pub container: Option<Snowflake>,
}

impl EntityRef {
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            container: None,
        }
    }

    pub fn in_container(id: Snowflake, container: Snowflake) -> Self {
        Self {
            id,
            container: Some(container),
        }
    }
}

/// A structure that can be stored in and rebuilt from the cache.
pub trait Cached: Sized + Serialize {
    const RESOURCE: Resource;

    fn cache_key(&self) -> EntityRef;

    fn rebuild(
        data: &Value,
        key: EntityRef,
        client: &ClientHandle,
    ) -> shardline_common::Result<Self>;
}

impl Cached for Member {
    const RESOURCE: Resource = Resource::Members;

    fn cache_key(&self) -> EntityRef {
        EntityRef::in_container(self.id(), self.guild_id)
    }

    fn rebuild(
        data: &Value,
        key: EntityRef,
        client: &ClientHandle,
    ) -> shardline_common::Result<Self> {
        let guild_id = key.container.ok_or(ShardlineError::MissingField("guild_id"))?;
        Member::from_raw(data, guild_id, client)
    }
}

impl Cached for Role {
    const RESOURCE: Resource = Resource::Roles;

    fn cache_key(&self) -> EntityRef {
        EntityRef::new(self.id)
    }

    fn rebuild(
        data: &Value,
        key: EntityRef,
        client: &ClientHandle,
    ) -> shardline_common::Result<Self> {
        let guild_id = snowflake_field(data, "guildId")?
            .or(key.container)
            .ok_or(ShardlineError::MissingField("guild_id"))?;
        Role::from_raw(data, guild_id, client)
    }
}

impl Cached for Guild {
    const RESOURCE: Resource = Resource::Guilds;

    fn cache_key(&self) -> EntityRef {
        EntityRef::new(self.id)
    }

    fn rebuild(
        data: &Value,
        _key: EntityRef,
        client: &ClientHandle,
    ) -> shardline_common::Result<Self> {
        Guild::from_raw(data, client)
    }
}

impl Cached for Channel {
    const RESOURCE: Resource = Resource::Channels;

    fn cache_key(&self) -> EntityRef {
        EntityRef::new(self.id())
    }

    fn rebuild(
        data: &Value,
        _key: EntityRef,
        client: &ClientHandle,
    ) -> shardline_common::Result<Self> {
        Channel::from_raw(data, client)
    }
}

#[derive(Clone)]
pub struct Cache {
    adapter: Arc<dyn CacheAdapter>,
}

impl Cache {
    pub fn new(adapter: Arc<dyn CacheAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<dyn CacheAdapter> {
        &self.adapter
    }

    pub fn is_async(&self) -> bool {
        self.adapter.is_async()
    }

    /// Raw record lookup. Adapter errors read as a miss.
    pub async fn lookup(&self, resource: Resource, key: EntityRef) -> Option<Value> {
        match self.adapter.get(resource, key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(?resource, id = %key.id, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Typed lookup. A stored record that no longer decodes reads as a miss.
    pub async fn get<T: Cached>(&self, key: EntityRef, client: &ClientHandle) -> Option<T> {
        let data = self.lookup(T::RESOURCE, key).await?;
        match T::rebuild(&data, key, client) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(
                    resource = ?T::RESOURCE,
                    id = %key.id,
                    error = %e,
                    "Cached record failed to rebuild"
                );
                None
            }
        }
    }

    pub async fn put<T: Cached>(&self, entity: &T) -> Result<()> {
        let data = serde_json::to_value(entity)?;
        self.adapter.set(T::RESOURCE, entity.cache_key(), data).await
    }

    pub async fn evict(&self, resource: Resource, key: EntityRef) -> Result<()> {
        self.adapter.remove(resource, key).await
    }

    pub async fn member(
        &self,
        user_id: Snowflake,
        guild_id: Snowflake,
        client: &ClientHandle,
    ) -> Option<Member> {
        self.get(EntityRef::in_container(user_id, guild_id), client).await
    }

    pub async fn role(&self, role_id: Snowflake, client: &ClientHandle) -> Option<Role> {
        self.get(EntityRef::new(role_id), client).await
    }

    pub async fn guild(&self, guild_id: Snowflake, client: &ClientHandle) -> Option<Guild> {
        self.get(EntityRef::new(guild_id), client).await
    }

    pub async fn channel(&self, channel_id: Snowflake, client: &ClientHandle) -> Option<Channel> {
        self.get(EntityRef::new(channel_id), client).await
    }
}

/// Subscriber that keeps the cache current with what was just emitted.
///
/// Registered like any other subscriber. Because delivery happens while the
/// shard is still held, the next event on the same shard sees these writes.
pub struct CacheWriter {
    cache: Cache,
}

impl CacheWriter {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    async fn remove_member(&self, removed: &Removed<Member>) -> Result<()> {
        let key = match removed {
            Removed::Cached(member) => Some(member.cache_key()),
            Removed::Partial(partial) => partial
                .user
                .as_ref()
                .map(|user| user.id)
                .zip(partial.id("guildId"))
                .map(|(user_id, guild_id)| EntityRef::in_container(user_id, guild_id)),
        };
        match key {
            Some(key) => self.cache.evict(Resource::Members, key).await,
            None => Ok(()),
        }
    }

    /// Cache the updated guild, keeping the nested records an update payload
    /// never carries.
    async fn update_guild(&self, diff: &Diff<Guild>) -> Result<()> {
        let mut guild = diff.new.clone();
        if let Some(old) = &diff.old {
            guild.members = old.members.clone();
            guild.channels = old.channels.clone();
            guild.threads = old.threads.clone();
            if guild.roles.is_empty() {
                guild.roles = old.roles.clone();
            }
            if guild.emojis.is_empty() {
                guild.emojis = old.emojis.clone();
            }
        }
        self.cache.put(&guild).await
    }

    /// An outage keeps everything and marks the guild; a removal evicts the
    /// guild along with its cached roles, members and channels.
    async fn delete_guild(&self, removed: &Removed<Guild>) -> Result<()> {
        let guild = match removed {
            Removed::Cached(guild) => guild,
            Removed::Partial(partial) => {
                let outage = partial
                    .data
                    .get("unavailable")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                return match partial.id("id") {
                    Some(id) if !outage => {
                        self.cache.evict(Resource::Guilds, EntityRef::new(id)).await
                    }
                    _ => Ok(()),
                };
            }
        };

        if guild.unavailable {
            debug!(guild_id = %guild.id, "Guild unavailable, cache kept");
            return self.cache.put(guild).await;
        }

        for role in &guild.roles {
            self.cache.evict(Resource::Roles, role.cache_key()).await?;
        }
        for member in &guild.members {
            self.cache.evict(Resource::Members, member.cache_key()).await?;
        }
        for channel in guild.channels.iter().chain(&guild.threads) {
            self.cache.evict(Resource::Channels, channel.cache_key()).await?;
        }
        self.cache.evict(Resource::Guilds, guild.cache_key()).await
    }

    async fn remove_by_id<T: Cached>(&self, removed: &Removed<T>, id_key: &str) -> Result<()> {
        let key = match removed {
            Removed::Cached(entity) => Some(entity.cache_key()),
            Removed::Partial(partial) => partial.id(id_key).map(EntityRef::new),
        };
        match key {
            Some(key) => self.cache.evict(T::RESOURCE, key).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Subscriber for CacheWriter {
    async fn on_event(&self, emission: &Emission) -> Result<()> {
        match emission.event.as_ref() {
            DomainEvent::GuildMemberAdd(member) => self.cache.put(member).await?,
            DomainEvent::GuildMemberUpdate(diff) => self.cache.put(&diff.new).await?,
            DomainEvent::GuildMemberRemove(removed) => self.remove_member(removed).await?,
            DomainEvent::GuildMembersChunk(chunk) => {
                for member in &chunk.members {
                    self.cache.put(member).await?;
                }
            }
            DomainEvent::GuildRoleCreate(role) => self.cache.put(role).await?,
            DomainEvent::GuildRoleUpdate(diff) => self.cache.put(&diff.new).await?,
            DomainEvent::GuildRoleDelete(removed) => self.remove_by_id(removed, "roleId").await?,
            DomainEvent::GuildCreate(guild) => {
                self.cache.put(guild).await?;
                for role in &guild.roles {
                    self.cache.put(role).await?;
                }
                for member in &guild.members {
                    self.cache.put(member).await?;
                }
                for channel in guild.channels.iter().chain(&guild.threads) {
                    self.cache.put(channel).await?;
                }
            }
            DomainEvent::GuildUpdate(diff) => self.update_guild(diff).await?,
            DomainEvent::GuildDelete(removed) => self.delete_guild(removed).await?,
            DomainEvent::ChannelCreate(channel) | DomainEvent::ChannelUpdate(channel) => {
                self.cache.put(channel).await?
            }
            DomainEvent::ChannelDelete(channel) => {
                self.cache
                    .evict(Resource::Channels, EntityRef::new(channel.id))
                    .await?
            }
            _ => return Ok(()),
        }

        debug!(event = emission.name, "Cache updated");
        Ok(())
    }
}
