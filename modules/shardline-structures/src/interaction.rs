use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::member::Member;
use crate::raw::decode;
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub user: Option<User>,
    /// Present for guild interactions; built with the interaction's guild id.
    #[serde(default, skip_deserializing)]
    pub member: Option<Member>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub guild_locale: Option<String>,
    #[serde(default)]
    pub app_permissions: Option<String>,
    #[serde(default)]
    pub version: u8,
    #[serde(skip)]
    client: ClientHandle,
}

impl Interaction {
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let mut interaction: Self = decode("interaction", raw)?;
        if let Some(user) = interaction.user.as_mut() {
            user.attach(client);
        }
        if let (Some(guild_id), Some(member)) = (interaction.guild_id, raw.get("member")) {
            interaction.member = Member::from_raw(member, guild_id, client).ok();
        }
        interaction.client = client.clone();
        Ok(interaction)
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// The invoking user, whether sent directly (DMs) or through the member.
    pub fn author(&self) -> Option<&User> {
        self.user
            .as_ref()
            .or_else(|| self.member.as_ref().map(|member| &member.user))
    }
}
