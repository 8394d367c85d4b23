//! Helpers for reading untyped wire records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use shardline_common::{to_camel_case, Result, ShardlineError, Snowflake};
use tracing::debug;

/// Normalize `raw` and deserialize it as `T`.
pub fn decode<T: DeserializeOwned>(kind: &'static str, raw: &Value) -> Result<T> {
    serde_json::from_value(to_camel_case(raw))
        .map_err(|source| ShardlineError::Malformed { kind, source })
}

/// Read an optional snowflake stored under a wire key.
pub fn snowflake_field(raw: &Value, key: &'static str) -> Result<Option<Snowflake>> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|id| Some(Snowflake::new(id)))
            .ok_or_else(|| ShardlineError::InvalidSnowflake(n.to_string())),
        Some(other) => Err(ShardlineError::InvalidSnowflake(other.to_string())),
    }
}

/// Read a snowflake that must be present.
pub fn required_snowflake(raw: &Value, key: &'static str) -> Result<Snowflake> {
    snowflake_field(raw, key)?.ok_or(ShardlineError::MissingField(key))
}

/// Build every element of the array field `key`; absent or non-array yields nothing.
///
/// Elements that fail to build are logged with the id of the record that
/// holds them and left out.
pub fn build_each<'a, T>(
    raw: &'a Value,
    key: &'static str,
    container: Snowflake,
    mut build: impl FnMut(&'a Value) -> Result<T>,
) -> Vec<T> {
    raw.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|element| match build(element) {
            Ok(built) => Some(built),
            Err(e) => {
                debug!(
                    container = %container,
                    field = key,
                    error = %e,
                    "Skipping undecodable record"
                );
                None
            }
        })
        .collect()
}

/// Copy of `raw` with `guild_id` set, for records the wire sends without it.
pub(crate) fn with_guild_id(raw: &Value, guild_id: Snowflake) -> Value {
    let mut stamped = raw.clone();
    if let Value::Object(map) = &mut stamped {
        map.insert("guild_id".to_string(), Value::String(guild_id.to_string()));
    }
    stamped
}
