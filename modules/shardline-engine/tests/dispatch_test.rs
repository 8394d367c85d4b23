//! Router dispatch: catch-all emission, one event per handled wire event,
//! skip conditions, and session side effects.

mod common;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use shardline_common::Snowflake;
use shardline_engine::{
    names, DispatchContext, DomainEvent, Emission, Handler, MemorySubscriber, Router, Subscriber,
};
use shardline_structures::Client;

use common::*;

fn id(raw: &str) -> Snowflake {
    raw.parse().unwrap()
}

// ---------------------------------------------------------------------------
// Catch-all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_event_emits_only_raw() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    let delivered = router
        .dispatch(&session, "SOMETHING_NEW", 3, json!({ "answer": 42 }))
        .await;

    assert_eq!(delivered, 1);
    let emissions = recorder.emissions();
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].name, names::RAW);
    assert_eq!(emissions[0].shard_id, 3);
    match emissions[0].event.as_ref() {
        DomainEvent::Raw(raw) => {
            assert_eq!(raw.event, "SOMETHING_NEW");
            assert_eq!(*raw.payload, json!({ "answer": 42 }));
        }
        other => panic!("expected raw, got {}", other.name()),
    }
}

#[tokio::test]
async fn empty_router_still_forwards_raw() {
    let session = session();
    let recorder = record(&session);

    let delivered = Router::new()
        .dispatch(&session, "MESSAGE_CREATE", 0, message("1"))
        .await;

    assert_eq!(delivered, 1);
    assert_eq!(recorder.names(), vec!["raw"]);
}

#[tokio::test]
async fn every_catalogue_event_emits_raw_then_exactly_one_event() {
    let router = Router::with_default_handlers();

    for (wire, payload, expected) in catalogue() {
        let session = session();
        let recorder = record(&session);

        let delivered = router.dispatch(&session, wire, 0, payload).await;

        assert_eq!(delivered, 2, "{wire} should emit raw plus one event");
        assert_eq!(recorder.names(), vec!["raw", expected], "{wire}");

        let emissions = recorder.emissions();
        assert_eq!(emissions[1].event.name(), expected, "{wire}");
        assert!(emissions.iter().all(|e| e.shard_id == 0));
    }
}

#[test]
fn catalogue_names_are_camel_case_of_wire_names() {
    for (wire, _, expected) in catalogue() {
        assert_eq!(shardline_common::camel_key(&wire.to_lowercase()), expected);
    }
}

// ---------------------------------------------------------------------------
// Skip conditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dm_channel_delete_is_skipped() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    let delivered = router
        .dispatch(&session, "CHANNEL_DELETE", 0, json!({ "id": "41", "type": 1 }))
        .await;

    assert_eq!(delivered, 1);
    assert_eq!(recorder.names(), vec!["raw"]);
}

#[tokio::test]
async fn thread_events_without_guild_are_skipped() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    for wire in ["THREAD_CREATE", "THREAD_UPDATE", "THREAD_DELETE"] {
        router.dispatch(&session, wire, 0, thread(None)).await;
    }

    assert_eq!(recorder.names(), vec!["raw", "raw", "raw"]);
}

#[tokio::test]
async fn malformed_payload_skips_the_specific_event() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    // No author.
    let delivered = router
        .dispatch(
            &session,
            "MESSAGE_CREATE",
            0,
            json!({ "id": "1", "channel_id": "41", "timestamp": TIMESTAMP }),
        )
        .await;
    assert_eq!(delivered, 1);

    // No user to key the member by.
    let delivered = router
        .dispatch(&session, "GUILD_MEMBER_UPDATE", 0, json!({ "guild_id": GUILD }))
        .await;
    assert_eq!(delivered, 1);

    assert_eq!(recorder.names(), vec!["raw", "raw"]);
}

#[tokio::test]
async fn failing_imperative_handler_discards_its_partial_output() {
    fn half_done(ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
        ctx.emit(DomainEvent::GuildIntegrationsUpdate(payload.clone()));
        bail!("second half missing")
    }

    let session = session();
    let recorder = record(&session);
    let mut router = Router::new();
    router.register("GUILD_INTEGRATIONS_UPDATE", Handler::imperative(half_done));

    let delivered = router
        .dispatch(&session, "GUILD_INTEGRATIONS_UPDATE", 0, json!({}))
        .await;

    assert_eq!(delivered, 1);
    assert_eq!(recorder.names(), vec!["raw"]);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_replaces_and_returns_previous_handler() {
    let mut router = Router::with_default_handlers();

    let previous = router.register(
        "MESSAGE_CREATE",
        Handler::map(names::GUILD_INTEGRATIONS_UPDATE, |_, payload| {
            Ok(DomainEvent::GuildIntegrationsUpdate(payload.clone()))
        }),
    );
    assert!(matches!(previous, Some(Handler::Functional(_))));

    let session = session();
    let recorder = record(&session);
    router.dispatch(&session, "MESSAGE_CREATE", 0, message("1")).await;

    assert_eq!(recorder.names(), vec!["raw", "guildIntegrationsUpdate"]);
    assert!(Router::new().register("X", Handler::imperative(noop)).is_none());
}

fn noop(_ctx: &mut DispatchContext<'_>, _payload: &Value) -> Result<()> {
    Ok(())
}

#[tokio::test]
async fn imperative_handler_may_emit_several_events() {
    fn fan_out(ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
        for entry in payload["entries"].as_array().into_iter().flatten() {
            ctx.emit(DomainEvent::GuildAuditLogEntryCreate(entry.clone()));
        }
        Ok(())
    }

    let session = session();
    let recorder = record(&session);
    let mut router = Router::new();
    router.register("AUDIT_BATCH", Handler::imperative(fan_out));

    let delivered = router
        .dispatch(&session, "AUDIT_BATCH", 0, json!({ "entries": [{ "id": 1 }, { "id": 2 }] }))
        .await;

    assert_eq!(delivered, 3);
    assert_eq!(
        recorder.names(),
        vec!["raw", "guildAuditLogEntryCreate", "guildAuditLogEntryCreate"]
    );
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

struct Failing;

#[async_trait]
impl Subscriber for Failing {
    async fn on_event(&self, _emission: &Emission) -> Result<()> {
        bail!("subscriber exploded")
    }
}

#[tokio::test]
async fn failing_subscriber_does_not_affect_others() {
    let session = session();
    session.on_any(Arc::new(Failing));
    let recorder = record(&session);

    let delivered = Router::with_default_handlers()
        .dispatch(&session, "MESSAGE_CREATE", 0, message("1"))
        .await;

    assert_eq!(delivered, 2);
    assert_eq!(recorder.names(), vec!["raw", "messageCreate"]);
}

#[tokio::test]
async fn named_subscriber_only_sees_its_event() {
    let session = session();
    let members = Arc::new(MemorySubscriber::new());
    session.on(names::GUILD_MEMBER_ADD, members.clone());
    let router = Router::with_default_handlers();

    router.dispatch(&session, "MESSAGE_CREATE", 0, message("1")).await;
    router.dispatch(&session, "GUILD_MEMBER_ADD", 0, member("10", "new")).await;

    assert_eq!(members.names(), vec!["guildMemberAdd"]);
    match members.emissions()[0].event.as_ref() {
        DomainEvent::GuildMemberAdd(member) => {
            assert_eq!(member.guild_id, id(GUILD));
            assert_eq!(member.nick.as_deref(), Some("new"));
            assert!(member.client().is_attached());
        }
        other => panic!("expected guildMemberAdd, got {}", other.name()),
    }
}

// ---------------------------------------------------------------------------
// Session side effects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ready_sets_session_identity() {
    let session = session();
    let recorder = record(&session);
    assert_eq!(session.bot_id(), None);

    Router::with_default_handlers()
        .dispatch(&session, "READY", 0, ready())
        .await;

    assert_eq!(session.application_id(), Some(id(APPLICATION)));
    assert_eq!(session.bot_id(), Some(id(BOT)));

    match recorder.emissions()[1].event.as_ref() {
        DomainEvent::Ready(ready) => {
            assert_eq!(ready.user.username, "shardline");
            assert_eq!(ready.guilds.len(), 1);
            assert_eq!(ready.shard, Some([0, 1]));
        }
        other => panic!("expected ready, got {}", other.name()),
    }
}

#[tokio::test]
async fn interaction_is_tracked_as_unreplied() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    router
        .dispatch(&session, "INTERACTION_CREATE", 0, interaction("900"))
        .await;

    let tracker = session.unreplied_interactions();
    assert!(tracker.is_registered(id("900")));

    match recorder.emissions()[1].event.as_ref() {
        DomainEvent::InteractionCreate(interaction) => {
            let author = interaction.author().expect("member user");
            assert_eq!(author.username, "caller");
        }
        other => panic!("expected interactionCreate, got {}", other.name()),
    }

    // Redelivery keeps the single registration but still emits.
    let delivered = router
        .dispatch(&session, "INTERACTION_CREATE", 0, interaction("900"))
        .await;
    assert_eq!(delivered, 2);
    assert_eq!(tracker.len(), 1);

    assert!(tracker.clear(id("900")));
    assert!(!tracker.is_registered(id("900")));
}

#[tokio::test]
async fn undecodable_interaction_is_not_tracked() {
    let session = session();
    let recorder = record(&session);

    let delivered = Router::with_default_handlers()
        .dispatch(&session, "INTERACTION_CREATE", 0, json!({ "id": "901" }))
        .await;

    assert_eq!(delivered, 1);
    assert_eq!(recorder.names(), vec!["raw"]);
    let tracker = session.unreplied_interactions();
    assert!(!tracker.is_registered(id("901")));
    assert!(tracker.is_empty());
}

#[tokio::test]
async fn thread_list_sync_skips_undecodable_records() {
    let session = session();
    let recorder = record(&session);

    Router::with_default_handlers()
        .dispatch(
            &session,
            "THREAD_LIST_SYNC",
            0,
            json!({
                "guild_id": GUILD,
                "threads": [thread(None), { "type": 11, "name": "no id" }],
                "members": [
                    { "id": "51", "user_id": "10", "join_timestamp": TIMESTAMP, "flags": 0 },
                    { "id": "not-a-snowflake" }
                ]
            }),
        )
        .await;

    match recorder.emissions()[1].event.as_ref() {
        DomainEvent::ThreadListSync(sync) => {
            assert_eq!(sync.threads.len(), 1);
            assert_eq!(sync.threads[0].base.guild_id, Some(id(GUILD)));
            assert_eq!(sync.members.len(), 1);
        }
        other => panic!("expected threadListSync, got {}", other.name()),
    }
}

#[tokio::test]
async fn emojis_update_skips_undecodable_records() {
    let session = session();
    let recorder = record(&session);

    Router::with_default_handlers()
        .dispatch(
            &session,
            "GUILD_EMOJIS_UPDATE",
            0,
            json!({
                "guild_id": GUILD,
                "emojis": [{ "id": "61", "name": "wave" }, { "id": "not-a-snowflake" }]
            }),
        )
        .await;

    match recorder.emissions()[1].event.as_ref() {
        DomainEvent::GuildEmojisUpdate(update) => {
            assert_eq!(update.emojis.len(), 1);
            assert_eq!(update.emojis[0].id, Some(id("61")));
        }
        other => panic!("expected guildEmojisUpdate, got {}", other.name()),
    }
}

#[tokio::test]
async fn dispatch_after_shutdown_is_dropped() {
    let session = session();
    let recorder = record(&session);
    let router = Router::with_default_handlers();

    router
        .dispatch(&session, "INTERACTION_CREATE", 0, interaction("900"))
        .await;
    session.shutdown();

    assert!(!session.is_alive());
    assert!(session.unreplied_interactions().is_empty());

    let delivered = router.dispatch(&session, "MESSAGE_CREATE", 0, message("2")).await;
    assert_eq!(delivered, 0);
    assert_eq!(recorder.names(), vec!["raw", "interactionCreate"]);
}

#[tokio::test]
async fn structures_lose_their_session_after_teardown() {
    let session = session();
    let recorder = record(&session);

    Router::with_default_handlers()
        .dispatch(&session, "GUILD_CREATE", 0, guild("home"))
        .await;

    let guild = match recorder.emissions()[1].event.as_ref() {
        DomainEvent::GuildCreate(guild) => guild.clone(),
        other => panic!("expected guildCreate, got {}", other.name()),
    };
    assert_eq!(guild.shard_id(), Some(0));
    assert_eq!(guild.roles.len(), 1);
    assert_eq!(guild.members.len(), 1);
    assert_eq!(guild.channels.len(), 1);
    assert_eq!(guild.threads.len(), 1);

    session.shutdown();
    assert_eq!(guild.shard_id(), None);
}
