use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::raw::{decode, with_guild_id};
use crate::user::User;

/// A user's membership in one guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub guild_id: Snowflake,
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub communication_disabled_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub flags: u64,
    #[serde(skip)]
    client: ClientHandle,
}

impl Member {
    /// Build a member of `guild_id`. The record's own `guild_id`, if any, is overridden.
    pub fn from_raw(raw: &Value, guild_id: Snowflake, client: &ClientHandle) -> Result<Self> {
        let mut member: Self = decode("member", &with_guild_id(raw, guild_id))?;
        member.attach(client);
        Ok(member)
    }

    pub(crate) fn attach(&mut self, client: &ClientHandle) {
        self.user.attach(client);
        self.client = client.clone();
    }

    pub fn id(&self) -> Snowflake {
        self.user.id
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or_else(|| self.user.display_name())
    }
}
