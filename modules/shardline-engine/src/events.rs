//! Domain event catalogue.
//!
//! One `DomainEvent` variant per subscriber-facing event. Handlers build
//! these from wire payloads; the router wraps them in an `Emission` whose
//! event is shared and immutable from then on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{to_camel_case, Snowflake};
use shardline_structures::{
    Channel, ClientHandle, Emoji, Guild, GuildChannel, Interaction, Member, Message, Role,
    Sticker, ThreadChannel, ThreadMember, User,
};

/// Subscriber-facing event names.
pub mod names {
    pub const READY: &str = "ready";
    pub const MESSAGE_CREATE: &str = "messageCreate";
    pub const MESSAGE_UPDATE: &str = "messageUpdate";
    pub const MESSAGE_DELETE: &str = "messageDelete";
    pub const GUILD_MEMBER_ADD: &str = "guildMemberAdd";
    pub const GUILD_MEMBER_UPDATE: &str = "guildMemberUpdate";
    pub const GUILD_MEMBER_REMOVE: &str = "guildMemberRemove";
    pub const GUILD_MEMBERS_CHUNK: &str = "guildMembersChunk";
    pub const INTERACTION_CREATE: &str = "interactionCreate";
    pub const CHANNEL_CREATE: &str = "channelCreate";
    pub const CHANNEL_UPDATE: &str = "channelUpdate";
    pub const CHANNEL_DELETE: &str = "channelDelete";
    pub const CHANNEL_PINS_UPDATE: &str = "channelPinsUpdate";
    pub const THREAD_CREATE: &str = "threadCreate";
    pub const THREAD_UPDATE: &str = "threadUpdate";
    pub const THREAD_DELETE: &str = "threadDelete";
    pub const THREAD_LIST_SYNC: &str = "threadListSync";
    pub const GUILD_CREATE: &str = "guildCreate";
    pub const GUILD_UPDATE: &str = "guildUpdate";
    pub const GUILD_DELETE: &str = "guildDelete";
    pub const GUILD_BAN_ADD: &str = "guildBanAdd";
    pub const GUILD_BAN_REMOVE: &str = "guildBanRemove";
    pub const GUILD_EMOJIS_UPDATE: &str = "guildEmojisUpdate";
    pub const GUILD_STICKERS_UPDATE: &str = "guildStickersUpdate";
    pub const GUILD_ROLE_CREATE: &str = "guildRoleCreate";
    pub const GUILD_ROLE_UPDATE: &str = "guildRoleUpdate";
    pub const GUILD_ROLE_DELETE: &str = "guildRoleDelete";
    pub const GUILD_AUDIT_LOG_ENTRY_CREATE: &str = "guildAuditLogEntryCreate";
    pub const GUILD_INTEGRATIONS_UPDATE: &str = "guildIntegrationsUpdate";
    pub const GUILD_SCHEDULED_EVENT_CREATE: &str = "guildScheduledEventCreate";
    pub const GUILD_SCHEDULED_EVENT_UPDATE: &str = "guildScheduledEventUpdate";
    pub const GUILD_SCHEDULED_EVENT_DELETE: &str = "guildScheduledEventDelete";
    pub const GUILD_SCHEDULED_EVENT_USER_ADD: &str = "guildScheduledEventUserAdd";
    pub const GUILD_SCHEDULED_EVENT_USER_REMOVE: &str = "guildScheduledEventUserRemove";
    pub const RAW: &str = "raw";
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum DomainEvent {
    Ready(Ready),
    MessageCreate(Message),
    MessageUpdate(Message),
    MessageDelete(MessageDelete),
    GuildMemberAdd(Member),
    GuildMemberUpdate(Diff<Member>),
    GuildMemberRemove(Removed<Member>),
    GuildMembersChunk(MembersChunk),
    InteractionCreate(Interaction),
    ChannelCreate(Channel),
    ChannelUpdate(Channel),
    ChannelDelete(GuildChannel),
    ChannelPinsUpdate(ChannelPinsUpdate),
    ThreadCreate(ThreadChannel),
    ThreadUpdate(ThreadChannel),
    ThreadDelete(ThreadChannel),
    ThreadListSync(ThreadListSync),
    GuildCreate(Guild),
    GuildUpdate(Diff<Guild>),
    GuildDelete(Removed<Guild>),
    GuildBanAdd(GuildBan),
    GuildBanRemove(GuildBan),
    GuildEmojisUpdate(GuildEmojisUpdate),
    GuildStickersUpdate(GuildStickersUpdate),
    GuildRoleCreate(Role),
    GuildRoleUpdate(Diff<Role>),
    GuildRoleDelete(Removed<Role>),
    GuildAuditLogEntryCreate(Value),
    GuildIntegrationsUpdate(Value),
    GuildScheduledEventCreate(Value),
    GuildScheduledEventUpdate(Value),
    GuildScheduledEventDelete(Value),
    GuildScheduledEventUserAdd(Value),
    GuildScheduledEventUserRemove(Value),
    Raw(RawEvent),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => names::READY,
            Self::MessageCreate(_) => names::MESSAGE_CREATE,
            Self::MessageUpdate(_) => names::MESSAGE_UPDATE,
            Self::MessageDelete(_) => names::MESSAGE_DELETE,
            Self::GuildMemberAdd(_) => names::GUILD_MEMBER_ADD,
            Self::GuildMemberUpdate(_) => names::GUILD_MEMBER_UPDATE,
            Self::GuildMemberRemove(_) => names::GUILD_MEMBER_REMOVE,
            Self::GuildMembersChunk(_) => names::GUILD_MEMBERS_CHUNK,
            Self::InteractionCreate(_) => names::INTERACTION_CREATE,
            Self::ChannelCreate(_) => names::CHANNEL_CREATE,
            Self::ChannelUpdate(_) => names::CHANNEL_UPDATE,
            Self::ChannelDelete(_) => names::CHANNEL_DELETE,
            Self::ChannelPinsUpdate(_) => names::CHANNEL_PINS_UPDATE,
            Self::ThreadCreate(_) => names::THREAD_CREATE,
            Self::ThreadUpdate(_) => names::THREAD_UPDATE,
            Self::ThreadDelete(_) => names::THREAD_DELETE,
            Self::ThreadListSync(_) => names::THREAD_LIST_SYNC,
            Self::GuildCreate(_) => names::GUILD_CREATE,
            Self::GuildUpdate(_) => names::GUILD_UPDATE,
            Self::GuildDelete(_) => names::GUILD_DELETE,
            Self::GuildBanAdd(_) => names::GUILD_BAN_ADD,
            Self::GuildBanRemove(_) => names::GUILD_BAN_REMOVE,
            Self::GuildEmojisUpdate(_) => names::GUILD_EMOJIS_UPDATE,
            Self::GuildStickersUpdate(_) => names::GUILD_STICKERS_UPDATE,
            Self::GuildRoleCreate(_) => names::GUILD_ROLE_CREATE,
            Self::GuildRoleUpdate(_) => names::GUILD_ROLE_UPDATE,
            Self::GuildRoleDelete(_) => names::GUILD_ROLE_DELETE,
            Self::GuildAuditLogEntryCreate(_) => names::GUILD_AUDIT_LOG_ENTRY_CREATE,
            Self::GuildIntegrationsUpdate(_) => names::GUILD_INTEGRATIONS_UPDATE,
            Self::GuildScheduledEventCreate(_) => names::GUILD_SCHEDULED_EVENT_CREATE,
            Self::GuildScheduledEventUpdate(_) => names::GUILD_SCHEDULED_EVENT_UPDATE,
            Self::GuildScheduledEventDelete(_) => names::GUILD_SCHEDULED_EVENT_DELETE,
            Self::GuildScheduledEventUserAdd(_) => names::GUILD_SCHEDULED_EVENT_USER_ADD,
            Self::GuildScheduledEventUserRemove(_) => names::GUILD_SCHEDULED_EVENT_USER_REMOVE,
            Self::Raw(_) => names::RAW,
        }
    }
}

/// A delivered event: name, originating shard, and the shared payload.
#[derive(Debug, Clone, Serialize)]
pub struct Emission {
    pub name: &'static str,
    pub shard_id: u32,
    pub event: Arc<DomainEvent>,
}

impl Emission {
    pub fn new(name: &'static str, shard_id: u32, event: DomainEvent) -> Self {
        Self {
            name,
            shard_id,
            event: Arc::new(event),
        }
    }
}

// ---------------------------------------------------------------------------
// Update / removal shapes
// ---------------------------------------------------------------------------

/// New state plus the cached state it replaced, if the cache had one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diff<T> {
    pub new: T,
    pub old: Option<T>,
}

/// A removed entity: the cached copy when available, otherwise what the
/// wire payload carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "entity", rename_all = "camelCase")]
pub enum Removed<T> {
    Cached(T),
    Partial(PartialEntity),
}

impl<T> Removed<T> {
    pub fn cached(&self) -> Option<&T> {
        match self {
            Self::Cached(entity) => Some(entity),
            Self::Partial(_) => None,
        }
    }

    pub fn partial(&self) -> Option<&PartialEntity> {
        match self {
            Self::Cached(_) => None,
            Self::Partial(partial) => Some(partial),
        }
    }
}

/// Stand-in for an entity the cache did not have.
///
/// `data` is the normalized removal payload, so every identifier the wire
/// sent is kept. An embedded `user` record is lifted out into a `User`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialEntity {
    pub data: Value,
    pub user: Option<User>,
}

impl PartialEntity {
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Self {
        let mut data = to_camel_case(raw);
        let user = raw
            .get("user")
            .and_then(|user| User::from_raw(user, client).ok());
        if user.is_some() {
            if let Value::Object(map) = &mut data {
                map.remove("user");
            }
        }
        Self { data, user }
    }

    /// Snowflake stored under a normalized key of `data`.
    pub fn id(&self, key: &str) -> Option<Snowflake> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyApplication {
    pub id: Snowflake,
    #[serde(default)]
    pub flags: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ready {
    pub v: u8,
    pub user: User,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub application: ReadyApplication,
    pub guilds: Vec<UnavailableGuild>,
    pub shard: Option<[u32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDelete {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPinsUpdate {
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadListSync {
    pub guild_id: Snowflake,
    pub channel_ids: Vec<Snowflake>,
    pub threads: Vec<ThreadChannel>,
    pub members: Vec<ThreadMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersChunk {
    pub guild_id: Snowflake,
    pub members: Vec<Member>,
    pub chunk_index: u32,
    pub chunk_count: u32,
    pub not_found: Vec<Snowflake>,
    pub nonce: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildBan {
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildEmojisUpdate {
    pub guild_id: Snowflake,
    pub emojis: Vec<Emoji>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildStickersUpdate {
    pub guild_id: Snowflake,
    pub stickers: Vec<Sticker>,
}

/// Catch-all emission sent for every dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct RawEvent {
    pub event: String,
    pub payload: Arc<Value>,
}
