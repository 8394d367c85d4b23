//! Channel structures and the discriminant-driven channel factory.
//!
//! The wire `type` tag selects the variant through `CHANNEL_TABLE`. Tags the
//! table does not know build `Channel::Unknown` so newer channel kinds still
//! reach subscribers.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{to_camel_case, Result, ShardlineError, Snowflake};

use crate::client::ClientHandle;
use crate::raw::{decode, with_guild_id};
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    GuildText = 0,
    Dm = 1,
    GuildVoice = 2,
    GroupDm = 3,
    GuildCategory = 4,
    GuildAnnouncement = 5,
    AnnouncementThread = 10,
    PublicThread = 11,
    PrivateThread = 12,
    GuildStageVoice = 13,
    GuildDirectory = 14,
    GuildForum = 15,
    GuildMedia = 16,
}

type Constructor = fn(Value) -> serde_json::Result<Channel>;

/// Tag → constructor. One line per wire tag.
const CHANNEL_TABLE: &[(ChannelType, Constructor)] = &[
    (ChannelType::GuildText, text),
    (ChannelType::Dm, dm),
    (ChannelType::GuildVoice, voice),
    (ChannelType::GroupDm, dm),
    (ChannelType::GuildCategory, category),
    (ChannelType::GuildAnnouncement, news),
    (ChannelType::AnnouncementThread, thread),
    (ChannelType::PublicThread, thread),
    (ChannelType::PrivateThread, thread),
    (ChannelType::GuildStageVoice, stage),
    (ChannelType::GuildDirectory, directory),
    (ChannelType::GuildForum, forum),
    (ChannelType::GuildMedia, media),
];

impl ChannelType {
    pub fn from_tag(tag: u64) -> Option<Self> {
        CHANNEL_TABLE
            .iter()
            .map(|(kind, _)| *kind)
            .find(|kind| *kind as u64 == tag)
    }

    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

fn constructor_for(tag: Option<u64>) -> Constructor {
    tag.and_then(|tag| CHANNEL_TABLE.iter().find(|(kind, _)| *kind as u64 == tag))
        .map(|(_, ctor)| *ctor)
        .unwrap_or(unknown)
}

fn text(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Text)
}

fn news(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::News)
}

fn dm(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Dm)
}

fn voice(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Voice)
}

fn stage(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Stage)
}

fn category(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Category)
}

fn directory(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Directory)
}

fn thread(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Thread)
}

fn forum(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Forum)
}

fn media(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Media)
}

fn unknown(v: Value) -> serde_json::Result<Channel> {
    serde_json::from_value(v).map(Channel::Unknown)
}

// ---------------------------------------------------------------------------
// Variant payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOverwrite {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub allow: String,
    #[serde(default)]
    pub deny: String,
}

/// Fields every guild channel carries. Also the fallback variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildChannel {
    pub id: Snowflake,
    #[serde(rename = "type", default)]
    pub kind: u64,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub flags: u64,
    #[serde(skip)]
    client: ClientHandle,
}

impl GuildChannel {
    /// Build a guild channel regardless of the record's type tag.
    pub fn from_raw(raw: &Value, guild_id: Snowflake, client: &ClientHandle) -> Result<Self> {
        let mut channel: Self = decode("guild channel", &with_guild_id(raw, guild_id))?;
        channel.client = client.clone();
        Ok(channel)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChannel {
    #[serde(flatten)]
    pub base: GuildChannel,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
    #[serde(default)]
    pub rate_limit_per_user: Option<u32>,
    #[serde(default)]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChannel {
    #[serde(flatten)]
    pub base: GuildChannel,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub rtc_region: Option<String>,
    #[serde(default)]
    pub video_quality_mode: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMetadata {
    pub archived: bool,
    pub auto_archive_duration: u32,
    pub archive_timestamp: DateTime<Utc>,
    pub locked: bool,
    #[serde(default)]
    pub invitable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadChannel {
    #[serde(flatten)]
    pub base: GuildChannel,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
    #[serde(default)]
    pub message_count: Option<u32>,
    #[serde(default)]
    pub member_count: Option<u32>,
    #[serde(default)]
    pub thread_metadata: Option<ThreadMetadata>,
    #[serde(default)]
    pub applied_tags: Vec<Snowflake>,
}

impl ThreadChannel {
    /// Build a thread of `guild_id` regardless of the record's type tag.
    pub fn from_raw(raw: &Value, guild_id: Snowflake, client: &ClientHandle) -> Result<Self> {
        let mut thread: Self = decode("thread", &with_guild_id(raw, guild_id))?;
        thread.base.client = client.clone();
        Ok(thread)
    }

    pub fn is_archived(&self) -> bool {
        self.thread_metadata.as_ref().is_some_and(|meta| meta.archived)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumTag {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub moderated: bool,
    #[serde(default)]
    pub emoji_id: Option<Snowflake>,
    #[serde(default)]
    pub emoji_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumChannel {
    #[serde(flatten)]
    pub base: GuildChannel,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub available_tags: Vec<ForumTag>,
    #[serde(default)]
    pub default_sort_order: Option<u8>,
    #[serde(default)]
    pub default_forum_layout: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmChannel {
    pub id: Snowflake,
    #[serde(rename = "type", default)]
    pub kind: u64,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
    #[serde(default)]
    pub recipients: Vec<User>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(skip)]
    client: ClientHandle,
}

/// Thread membership as carried by thread list syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMember {
    #[serde(default)]
    pub id: Option<Snowflake>,
    #[serde(default)]
    pub user_id: Option<Snowflake>,
    pub join_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub flags: u64,
}

impl ThreadMember {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        decode("thread member", raw)
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Channel {
    Text(TextChannel),
    News(TextChannel),
    Dm(DmChannel),
    Voice(VoiceChannel),
    Stage(VoiceChannel),
    Category(GuildChannel),
    Directory(GuildChannel),
    Thread(ThreadChannel),
    Forum(ForumChannel),
    Media(ForumChannel),
    /// Tag missing or not in the table.
    Unknown(GuildChannel),
}

impl Channel {
    /// Build the variant selected by the record's `type` tag.
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let mut channel = Self::from_normalized(to_camel_case(raw))?;
        channel.attach(client);
        Ok(channel)
    }

    /// Like `from_raw`, for channels listed inside a guild payload without their guild id.
    pub fn from_raw_in_guild(
        raw: &Value,
        guild_id: Snowflake,
        client: &ClientHandle,
    ) -> Result<Self> {
        Self::from_raw(&with_guild_id(raw, guild_id), client)
    }

    fn from_normalized(data: Value) -> Result<Self> {
        let tag = data.get("type").and_then(Value::as_u64);
        constructor_for(tag)(data).map_err(|source| ShardlineError::Malformed {
            kind: "channel",
            source,
        })
    }

    fn attach(&mut self, client: &ClientHandle) {
        match self.head_mut() {
            HeadMut::Guild(base) => base.client = client.clone(),
            HeadMut::Dm(dm) => {
                for user in &mut dm.recipients {
                    user.attach(client);
                }
                dm.client = client.clone();
            }
        }
    }

    fn head(&self) -> Head<'_> {
        match self {
            Self::Text(c) | Self::News(c) => Head::Guild(&c.base),
            Self::Voice(c) | Self::Stage(c) => Head::Guild(&c.base),
            Self::Thread(c) => Head::Guild(&c.base),
            Self::Forum(c) | Self::Media(c) => Head::Guild(&c.base),
            Self::Category(c) | Self::Directory(c) | Self::Unknown(c) => Head::Guild(c),
            Self::Dm(c) => Head::Dm(c),
        }
    }

    fn head_mut(&mut self) -> HeadMut<'_> {
        match self {
            Self::Text(c) | Self::News(c) => HeadMut::Guild(&mut c.base),
            Self::Voice(c) | Self::Stage(c) => HeadMut::Guild(&mut c.base),
            Self::Thread(c) => HeadMut::Guild(&mut c.base),
            Self::Forum(c) | Self::Media(c) => HeadMut::Guild(&mut c.base),
            Self::Category(c) | Self::Directory(c) | Self::Unknown(c) => HeadMut::Guild(c),
            Self::Dm(c) => HeadMut::Dm(c),
        }
    }

    pub fn id(&self) -> Snowflake {
        match self.head() {
            Head::Guild(base) => base.id,
            Head::Dm(dm) => dm.id,
        }
    }

    /// Raw wire tag.
    pub fn kind(&self) -> u64 {
        match self.head() {
            Head::Guild(base) => base.kind,
            Head::Dm(dm) => dm.kind,
        }
    }

    pub fn channel_type(&self) -> Option<ChannelType> {
        ChannelType::from_tag(self.kind())
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        match self.head() {
            Head::Guild(base) => base.guild_id,
            Head::Dm(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.head() {
            Head::Guild(base) => base.name.as_deref(),
            Head::Dm(dm) => dm.name.as_deref(),
        }
    }

    pub fn client(&self) -> &ClientHandle {
        match self.head() {
            Head::Guild(base) => &base.client,
            Head::Dm(dm) => &dm.client,
        }
    }

    pub fn is_thread(&self) -> bool {
        matches!(self, Self::Thread(_))
    }
}

enum Head<'a> {
    Guild(&'a GuildChannel),
    Dm(&'a DmChannel),
}

enum HeadMut<'a> {
    Guild(&'a mut GuildChannel),
    Dm(&'a mut DmChannel),
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Text(c) | Self::News(c) => c.serialize(serializer),
            Self::Dm(c) => c.serialize(serializer),
            Self::Voice(c) | Self::Stage(c) => c.serialize(serializer),
            Self::Thread(c) => c.serialize(serializer),
            Self::Forum(c) | Self::Media(c) => c.serialize(serializer),
            Self::Category(c) | Self::Directory(c) | Self::Unknown(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = Value::deserialize(deserializer)?;
        Self::from_normalized(data).map_err(de::Error::custom)
    }
}
