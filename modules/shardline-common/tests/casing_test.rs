//! Field mapper behaviour on realistic gateway payloads.

use serde_json::json;
use shardline_common::to_camel_case;

#[test]
fn flat_record_without_renamed_keys_is_unchanged() {
    let raw = json!({"id": "1", "name": "general", "position": 3, "nsfw": false});
    assert_eq!(to_camel_case(&raw), raw);
}

#[test]
fn input_is_not_mutated() {
    let raw = json!({
        "guild_id": "81384788765712384",
        "user": {"id": "80351110224678912", "global_name": "Nelly"},
        "roles": ["41771983423143936"],
    });
    let snapshot = raw.clone();

    let normalized = to_camel_case(&raw);

    assert_eq!(raw, snapshot);
    assert_ne!(normalized, raw);
}

#[test]
fn nested_records_and_arrays_are_renamed() {
    let raw = json!({
        "guild_id": "1",
        "members": [
            {"joined_at": "2024-01-01T00:00:00Z", "user": {"avatar_decoration_data": null}},
        ],
        "channel_ids": ["2", "3"],
    });

    assert_eq!(
        to_camel_case(&raw),
        json!({
            "guildId": "1",
            "members": [
                {"joinedAt": "2024-01-01T00:00:00Z", "user": {"avatarDecorationData": null}},
            ],
            "channelIds": ["2", "3"],
        })
    );
}

#[test]
fn scalars_pass_through() {
    assert_eq!(to_camel_case(&json!("some_string")), json!("some_string"));
    assert_eq!(to_camel_case(&json!(42)), json!(42));
    assert_eq!(to_camel_case(&json!(null)), json!(null));
}
