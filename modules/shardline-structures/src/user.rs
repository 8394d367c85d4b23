use serde::{Deserialize, Serialize};
use serde_json::Value;
use shardline_common::{Result, Snowflake};

use crate::client::ClientHandle;
use crate::raw::decode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(skip)]
    client: ClientHandle,
}

impl User {
    pub fn from_raw(raw: &Value, client: &ClientHandle) -> Result<Self> {
        let mut user: Self = decode("user", raw)?;
        user.client = client.clone();
        Ok(user)
    }

    pub(crate) fn attach(&mut self, client: &ClientHandle) {
        self.client = client.clone();
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Global display name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}
