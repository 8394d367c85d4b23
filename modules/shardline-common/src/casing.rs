//! Wire → domain key renaming.
//!
//! Gateway payloads use snake_case keys; domain records use camelCase.
//! The rename is total: keys without an underscore come back unchanged and
//! an underscore followed by a digit (or nothing) is kept verbatim, so
//! `format_v2` becomes `formatV2` while `size_2x` stays as it is.

use serde_json::{Map, Value};

/// Rename a single wire key to its domain form.
pub fn camel_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(next) if !next.is_ascii_digit() => {
                    out.extend(next.to_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Recursively rename every object key in `raw`.
///
/// Objects nested at any depth (including inside arrays) are renamed,
/// scalars pass through. The input is only borrowed; a fresh value is built.
pub fn to_camel_case(raw: &Value) -> Value {
    match raw {
        Value::Object(map) => Value::Object(camel_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(to_camel_case).collect()),
        other => other.clone(),
    }
}

fn camel_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (camel_key(key), to_camel_case(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renames_simple_keys() {
        assert_eq!(camel_key("guild_id"), "guildId");
        assert_eq!(camel_key("last_pin_timestamp"), "lastPinTimestamp");
        assert_eq!(camel_key("id"), "id");
    }

    #[test]
    fn keeps_underscore_before_digit_and_trailing() {
        assert_eq!(camel_key("size_2x"), "size_2x");
        assert_eq!(camel_key("format_v2"), "formatV2");
        assert_eq!(camel_key("trailing_"), "trailing_");
    }

    #[test]
    fn nested_arrays_stay_arrays() {
        let raw = json!({"matrix_rows": [[{"cell_id": 1}], [2, 3]]});
        assert_eq!(
            to_camel_case(&raw),
            json!({"matrixRows": [[{"cellId": 1}], [2, 3]]})
        );
    }
}
