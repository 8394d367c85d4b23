use anyhow::Result;
use serde_json::Value;
use shardline_structures::Interaction;
use tracing::debug;

use crate::engine::{DispatchContext, Handler, Router};
use crate::events::DomainEvent;

/// Every interaction starts out unreplied until a response clears it or the
/// window runs out. Only interactions that decode are tracked.
fn interaction_create(ctx: &mut DispatchContext<'_>, payload: &Value) -> Result<()> {
    let session = ctx.session();
    let interaction = Interaction::from_raw(payload, session.handle())?;

    if !session.unreplied_interactions().register(interaction.id) {
        debug!(id = %interaction.id, "Interaction already awaiting a reply");
    }

    ctx.emit(DomainEvent::InteractionCreate(interaction));
    Ok(())
}

pub(super) fn register(router: &mut Router) {
    router.register("INTERACTION_CREATE", Handler::imperative(interaction_create));
}
