use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::raw::{decode, with_guild_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub unicode_emoji: Option<String>,
    #[serde(default)]
    pub position: i64,
    /// Permission bitset as sent on the wire (decimal string).
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
    #[serde(skip)]
    client: ClientHandle,
}

impl Role {
    pub fn from_raw(raw: &Value, guild_id: Snowflake, client: &ClientHandle) -> Result<Self> {
        let mut role: Self = decode("role", &with_guild_id(raw, guild_id))?;
        role.client = client.clone();
        Ok(role)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    pub fn permission_bits(&self) -> u64 {
        self.permissions.parse().unwrap_or(0)
    }
}
