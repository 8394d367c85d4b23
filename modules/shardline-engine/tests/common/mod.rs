//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use shardline_common::Config;
use shardline_engine::{CacheAdapter, CacheWriter, MemoryAdapter, MemorySubscriber, Session};

pub const GUILD: &str = "81384788765712384";
pub const BOT: &str = "100";
pub const APPLICATION: &str = "200";
pub const TIMESTAMP: &str = "2024-01-01T00:00:00+00:00";

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub fn session() -> Arc<Session> {
    Session::new(Config::default(), Arc::new(MemoryAdapter::new()))
}

pub fn session_with(adapter: Arc<dyn CacheAdapter>) -> Arc<Session> {
    Session::new(Config::default(), adapter)
}

/// Attach a catch-all recorder.
pub fn record(session: &Session) -> Arc<MemorySubscriber> {
    let recorder = Arc::new(MemorySubscriber::new());
    session.on_any(recorder.clone());
    recorder
}

/// Keep the session's cache current with what it emits.
pub fn write_through(session: &Session) {
    session.on_any(Arc::new(CacheWriter::new(session.cache().clone())));
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

pub fn user(id: &str, username: &str) -> Value {
    json!({ "id": id, "username": username, "global_name": null, "avatar": null })
}

pub fn member(user_id: &str, nick: &str) -> Value {
    json!({
        "guild_id": GUILD,
        "user": user(user_id, "someone"),
        "nick": nick,
        "roles": ["31"],
        "joined_at": TIMESTAMP,
        "deaf": false,
        "mute": false
    })
}

pub fn role(id: &str, name: &str, permissions: &str) -> Value {
    json!({
        "guild_id": GUILD,
        "role": {
            "id": id,
            "name": name,
            "color": 0,
            "hoist": false,
            "position": 1,
            "permissions": permissions,
            "managed": false,
            "mentionable": true
        }
    })
}

pub fn guild(name: &str) -> Value {
    json!({
        "id": GUILD,
        "name": name,
        "owner_id": "10",
        "features": ["COMMUNITY"],
        "member_count": 2,
        "joined_at": TIMESTAMP,
        "roles": [{ "id": "31", "name": "mod", "permissions": "8" }],
        "members": [member("10", "owner")],
        "channels": [{ "id": "41", "type": 0, "name": "general" }],
        "threads": [{ "id": "51", "type": 11, "name": "chatter", "parent_id": "41" }]
    })
}

pub fn message(id: &str) -> Value {
    json!({
        "id": id,
        "channel_id": "41",
        "guild_id": GUILD,
        "author": user("10", "author"),
        "content": "hello",
        "timestamp": TIMESTAMP,
        "type": 0
    })
}

pub fn interaction(id: &str) -> Value {
    json!({
        "id": id,
        "application_id": APPLICATION,
        "type": 2,
        "token": "interaction-token",
        "guild_id": GUILD,
        "channel_id": "41",
        "member": {
            "user": user("10", "caller"),
            "roles": [],
            "joined_at": TIMESTAMP
        },
        "data": { "name": "ping" },
        "version": 1
    })
}

pub fn thread(guild_id: Option<&str>) -> Value {
    let mut thread = json!({ "id": "51", "type": 11, "name": "chatter", "parent_id": "41" });
    if let Some(guild_id) = guild_id {
        thread["guild_id"] = json!(guild_id);
    }
    thread
}

pub fn ready() -> Value {
    json!({
        "v": 10,
        "user": { "id": BOT, "username": "shardline", "bot": true },
        "session_id": "session-1",
        "resume_gateway_url": "wss://gateway.example",
        "application": { "id": APPLICATION, "flags": 0 },
        "guilds": [{ "id": GUILD, "unavailable": true }],
        "shard": [0, 1]
    })
}

/// Every catalogue event: wire name, a valid payload, the domain name it emits.
pub fn catalogue() -> Vec<(&'static str, Value, &'static str)> {
    let passthrough = json!({ "id": "81", "guild_id": GUILD, "action_type": 1 });

    vec![
        ("READY", ready(), "ready"),
        ("MESSAGE_CREATE", message("1"), "messageCreate"),
        ("MESSAGE_UPDATE", message("1"), "messageUpdate"),
        (
            "MESSAGE_DELETE",
            json!({ "id": "1", "channel_id": "41", "guild_id": GUILD }),
            "messageDelete",
        ),
        ("GUILD_MEMBER_ADD", member("10", "new"), "guildMemberAdd"),
        ("GUILD_MEMBER_UPDATE", member("10", "renamed"), "guildMemberUpdate"),
        (
            "GUILD_MEMBER_REMOVE",
            json!({ "guild_id": GUILD, "user": user("10", "gone") }),
            "guildMemberRemove",
        ),
        (
            "GUILD_MEMBERS_CHUNK",
            json!({
                "guild_id": GUILD,
                "members": [member("10", "a"), member("11", "b")],
                "chunk_index": 0,
                "chunk_count": 1
            }),
            "guildMembersChunk",
        ),
        ("INTERACTION_CREATE", interaction("900"), "interactionCreate"),
        (
            "CHANNEL_CREATE",
            json!({ "id": "41", "type": 0, "guild_id": GUILD, "name": "general" }),
            "channelCreate",
        ),
        (
            "CHANNEL_UPDATE",
            json!({ "id": "41", "type": 2, "guild_id": GUILD, "name": "voice" }),
            "channelUpdate",
        ),
        (
            "CHANNEL_DELETE",
            json!({ "id": "41", "type": 0, "guild_id": GUILD, "name": "general" }),
            "channelDelete",
        ),
        (
            "CHANNEL_PINS_UPDATE",
            json!({ "channel_id": "41", "guild_id": GUILD, "last_pin_timestamp": TIMESTAMP }),
            "channelPinsUpdate",
        ),
        ("THREAD_CREATE", thread(Some(GUILD)), "threadCreate"),
        ("THREAD_UPDATE", thread(Some(GUILD)), "threadUpdate"),
        ("THREAD_DELETE", thread(Some(GUILD)), "threadDelete"),
        (
            "THREAD_LIST_SYNC",
            json!({
                "guild_id": GUILD,
                "channel_ids": ["41"],
                "threads": [thread(None)],
                "members": [{ "id": "51", "user_id": "10", "join_timestamp": TIMESTAMP, "flags": 0 }]
            }),
            "threadListSync",
        ),
        ("GUILD_CREATE", guild("home"), "guildCreate"),
        ("GUILD_UPDATE", json!({ "id": GUILD, "name": "renamed" }), "guildUpdate"),
        ("GUILD_DELETE", json!({ "id": GUILD, "unavailable": true }), "guildDelete"),
        (
            "GUILD_BAN_ADD",
            json!({ "guild_id": GUILD, "user": user("12", "banned") }),
            "guildBanAdd",
        ),
        (
            "GUILD_BAN_REMOVE",
            json!({ "guild_id": GUILD, "user": user("12", "banned") }),
            "guildBanRemove",
        ),
        (
            "GUILD_EMOJIS_UPDATE",
            json!({ "guild_id": GUILD, "emojis": [{ "id": "61", "name": "wave" }] }),
            "guildEmojisUpdate",
        ),
        (
            "GUILD_STICKERS_UPDATE",
            json!({
                "guild_id": GUILD,
                "stickers": [{ "id": "71", "name": "cat", "tags": "cat", "type": 2, "format_type": 1 }]
            }),
            "guildStickersUpdate",
        ),
        ("GUILD_ROLE_CREATE", role("31", "mod", "8"), "guildRoleCreate"),
        ("GUILD_ROLE_UPDATE", role("31", "admin", "8"), "guildRoleUpdate"),
        (
            "GUILD_ROLE_DELETE",
            json!({ "guild_id": GUILD, "role_id": "31" }),
            "guildRoleDelete",
        ),
        ("GUILD_AUDIT_LOG_ENTRY_CREATE", passthrough.clone(), "guildAuditLogEntryCreate"),
        ("GUILD_INTEGRATIONS_UPDATE", passthrough.clone(), "guildIntegrationsUpdate"),
        ("GUILD_SCHEDULED_EVENT_CREATE", passthrough.clone(), "guildScheduledEventCreate"),
        ("GUILD_SCHEDULED_EVENT_UPDATE", passthrough.clone(), "guildScheduledEventUpdate"),
        ("GUILD_SCHEDULED_EVENT_DELETE", passthrough.clone(), "guildScheduledEventDelete"),
        ("GUILD_SCHEDULED_EVENT_USER_ADD", passthrough.clone(), "guildScheduledEventUserAdd"),
        ("GUILD_SCHEDULED_EVENT_USER_REMOVE", passthrough, "guildScheduledEventUserRemove"),
    ]
}
