use shardline_structures::{decode, Message};

use crate::engine::{Handler, Router};
use crate::events::{names, DomainEvent};

pub(super) fn register(router: &mut Router) {
    router.register(
        "MESSAGE_CREATE",
        Handler::map(names::MESSAGE_CREATE, |session, payload| {
            let message = Message::from_raw(payload, session.handle())?;
            Ok(DomainEvent::MessageCreate(message))
        }),
    );

    // Edits that only carry embeds have no author and are skipped.
    router.register(
        "MESSAGE_UPDATE",
        Handler::map(names::MESSAGE_UPDATE, |session, payload| {
            let message = Message::from_raw(payload, session.handle())?;
            Ok(DomainEvent::MessageUpdate(message))
        }),
    );

    router.register(
        "MESSAGE_DELETE",
        Handler::map(names::MESSAGE_DELETE, |_, payload| {
            Ok(DomainEvent::MessageDelete(decode("message delete", payload)?))
        }),
    );
}
