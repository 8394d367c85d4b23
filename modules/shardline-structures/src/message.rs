use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::raw::decode;
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default)]
    pub mention_roles: Vec<Snowflake>,
    #[serde(default)]
    pub webhook_id: Option<Snowflake>,
    #[serde(default)]
    pub attachments: Vec<Value>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(skip)]
    client: ClientHandle,
}

impl Message {
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let mut message: Self = decode("message", raw)?;
        message.author.attach(client);
        for user in &mut message.mentions {
            user.attach(client);
        }
        message.client = client.clone();
        Ok(message)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }
}
