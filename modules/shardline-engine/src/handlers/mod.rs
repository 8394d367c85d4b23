//! Default handlers, one per wire event of the catalogue.

mod channels;
mod guilds;
mod interactions;
mod members;
mod messages;
mod ready;

use serde_json::Value;
use shardline_common::{ShardlineError, Snowflake};
use shardline_structures::required_snowflake;

use crate::engine::Router;

pub(crate) fn register_defaults(router: &mut Router) {
    ready::register(router);
    messages::register(router);
    members::register(router);
    interactions::register(router);
    channels::register(router);
    guilds::register(router);
}

/// An object field that must be present.
fn nested<'a>(payload: &'a Value, key: &'static str) -> Result<&'a Value, ShardlineError> {
    payload
        .get(key)
        .filter(|value| value.is_object())
        .ok_or(ShardlineError::MissingField(key))
}

/// Id of the user record embedded under `user`.
fn user_id(payload: &Value) -> Result<Snowflake, ShardlineError> {
    required_snowflake(nested(payload, "user")?, "id")
}
