use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::channel::Channel;
use crate::client::ClientHandle;
use crate::emoji::Emoji;
use crate::member::Member;
use crate::raw::{build_each, decode, required_snowflake};
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub splash: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub large: bool,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,

    // Nested collections are built element by element in `from_raw`.
    #[serde(default, skip_deserializing)]
    pub roles: Vec<Role>,
    #[serde(default, skip_deserializing)]
    pub emojis: Vec<Emoji>,
    #[serde(default, skip_deserializing)]
    pub members: Vec<Member>,
    #[serde(default, skip_deserializing)]
    pub channels: Vec<Channel>,
    #[serde(default, skip_deserializing)]
    pub threads: Vec<Channel>,

    #[serde(skip)]
    client: ClientHandle,
}

impl Guild {
    /// Build a guild and everything listed inside it.
    ///
    /// Nested records that fail to decode are logged and left out rather
    /// than failing the whole guild.
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let id = required_snowflake(raw, "id")?;
        let mut guild: Self = decode("guild", raw)?;

        guild.roles = build_each(raw, "roles", id, |r| Role::from_raw(r, id, client));
        guild.emojis = build_each(raw, "emojis", id, |e| Emoji::from_raw(e, id, client));
        guild.members = build_each(raw, "members", id, |m| Member::from_raw(m, id, client));
        guild.channels = build_each(raw, "channels", id, |c| {
            Channel::from_raw_in_guild(c, id, client)
        });
        guild.threads = build_each(raw, "threads", id, |c| {
            Channel::from_raw_in_guild(c, id, client)
        });
        guild.client = client.clone();

        Ok(guild)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Shard that receives this guild's events, or `None` once the session is gone.
    pub fn shard_id(&self) -> Option<u32> {
        self.client
            .upgrade()
            .map(|client| self.id.shard_id(client.total_shards()))
    }

    pub fn partnered(&self) -> bool {
        self.has_feature("PARTNERED")
    }

    pub fn verified(&self) -> bool {
        self.has_feature("VERIFIED")
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn role(&self, id: Snowflake) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }
}
