use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::raw::{decode, with_guild_id};
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    pub id: Option<Snowflake>,
    pub guild_id: Snowflake,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub require_colons: bool,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(skip)]
    client: ClientHandle,
}

fn available_by_default() -> bool {
    true
}

impl Emoji {
    pub fn from_raw(raw: &Value, guild_id: Snowflake, client: &ClientHandle) -> Result<Self> {
        let mut emoji: Self = decode("emoji", &with_guild_id(raw, guild_id))?;
        if let Some(user) = emoji.user.as_mut() {
            user.attach(client);
        }
        emoji.client = client.clone();
        Ok(emoji)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub format_type: u8,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub available: bool,
    #[serde(skip)]
    client: ClientHandle,
}

impl Sticker {
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let mut sticker: Self = decode("sticker", raw)?;
        sticker.client = client.clone();
        Ok(sticker)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }
}
