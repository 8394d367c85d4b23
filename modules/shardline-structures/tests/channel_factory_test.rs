//! Discriminant dispatch for the channel factory.

use serde_json::{json, Value};
use shardline_structures::{Channel, ChannelType, ClientHandle, GuildChannel, ThreadChannel};

fn channel_record(kind: u64) -> Value {
    json!({
        "id": "41771983423143937",
        "type": kind,
        "guild_id": "41771983423143936",
        "name": "general",
        "position": 6,
        "permission_overwrites": [],
        "parent_id": null,
        "nsfw": true,
        "topic": "24/7 chat about how to gank Mike #2",
        "last_message_id": "155117677105512449",
        "rate_limit_per_user": 2,
    })
}

fn build(kind: u64) -> Channel {
    Channel::from_raw(&channel_record(kind), &ClientHandle::detached()).unwrap()
}

#[test]
fn every_known_tag_builds_its_variant() {
    assert!(matches!(build(0), Channel::Text(_)));
    assert!(matches!(build(1), Channel::Dm(_)));
    assert!(matches!(build(2), Channel::Voice(_)));
    assert!(matches!(build(3), Channel::Dm(_)));
    assert!(matches!(build(4), Channel::Category(_)));
    assert!(matches!(build(5), Channel::News(_)));
    assert!(matches!(build(10), Channel::Thread(_)));
    assert!(matches!(build(11), Channel::Thread(_)));
    assert!(matches!(build(12), Channel::Thread(_)));
    assert!(matches!(build(13), Channel::Stage(_)));
    assert!(matches!(build(14), Channel::Directory(_)));
    assert!(matches!(build(15), Channel::Forum(_)));
    assert!(matches!(build(16), Channel::Media(_)));
}

#[test]
fn unknown_tag_falls_back_to_base_variant() {
    let channel = build(99);
    let Channel::Unknown(base) = &channel else {
        panic!("expected fallback variant, got {channel:?}");
    };
    assert_eq!(base.kind, 99);
    assert_eq!(channel.name(), Some("general"));
    assert_eq!(channel.channel_type(), None);
}

#[test]
fn missing_tag_falls_back_to_base_variant() {
    let mut record = channel_record(0);
    record.as_object_mut().unwrap().remove("type");

    let channel = Channel::from_raw(&record, &ClientHandle::detached()).unwrap();
    assert!(matches!(channel, Channel::Unknown(_)));
}

#[test]
fn missing_id_is_an_error() {
    let record = json!({"type": 0, "name": "no-id"});
    assert!(Channel::from_raw(&record, &ClientHandle::detached()).is_err());
}

#[test]
fn text_fields_are_normalized() {
    let Channel::Text(text) = build(0) else {
        panic!("expected text channel");
    };
    assert_eq!(text.base.id.get(), 41771983423143937);
    assert_eq!(text.base.guild_id.map(|id| id.get()), Some(41771983423143936));
    assert_eq!(text.rate_limit_per_user, Some(2));
    assert_eq!(text.last_message_id.map(|id| id.get()), Some(155117677105512449));
    assert!(text.base.nsfw);
}

#[test]
fn dm_recipients_become_users() {
    let record = json!({
        "id": "319674150115610528",
        "type": 1,
        "last_message_id": "3343820033257021450",
        "recipients": [{"id": "82198898841029460", "username": "test", "global_name": "Test"}],
    });
    let channel = Channel::from_raw(&record, &ClientHandle::detached()).unwrap();
    let Channel::Dm(dm) = &channel else {
        panic!("expected dm channel");
    };
    assert_eq!(dm.recipients[0].display_name(), "Test");
    assert_eq!(channel.guild_id(), None);
}

#[test]
fn channel_type_lookup_matches_table() {
    assert_eq!(ChannelType::from_tag(15), Some(ChannelType::GuildForum));
    assert!(ChannelType::PrivateThread.is_thread());
    assert!(!ChannelType::GuildText.is_thread());
    assert_eq!(ChannelType::from_tag(7), None);
}

#[test]
fn forced_constructors_ignore_tag() {
    let guild_id = "41771983423143936".parse().unwrap();

    let as_guild = GuildChannel::from_raw(&channel_record(0), guild_id, &ClientHandle::detached())
        .unwrap();
    assert_eq!(as_guild.guild_id, Some(guild_id));

    let thread = ThreadChannel::from_raw(
        &json!({
            "id": "1",
            "type": 11,
            "owner_id": "2",
            "thread_metadata": {
                "archived": true,
                "auto_archive_duration": 60,
                "archive_timestamp": "2024-03-01T12:00:00.000000+00:00",
                "locked": false,
            },
        }),
        guild_id,
        &ClientHandle::detached(),
    )
    .unwrap();
    assert_eq!(thread.base.guild_id, Some(guild_id));
    assert!(thread.is_archived());
}

#[test]
fn serialized_channel_rebuilds_same_variant() {
    let channel = build(15);
    let stored = serde_json::to_value(&channel).unwrap();
    let rebuilt: Channel = serde_json::from_value(stored).unwrap();
    assert_eq!(rebuilt, channel);
}
