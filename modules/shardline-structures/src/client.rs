//! Back-reference from structures to the session that built them.

use std::fmt;
use std::sync::{Arc, Weak};

use shardline_common::Snowflake;

/// The parts of a session a structure may consult lazily.
pub trait Client: Send + Sync {
    fn application_id(&self) -> Option<Snowflake>;
    fn bot_id(&self) -> Option<Snowflake>;
    fn total_shards(&self) -> u32;
    fn is_alive(&self) -> bool;
}

/// Weak handle to the owning client.
///
/// Weak so a structure kept by a subscriber never keeps a torn-down session
/// alive; callers upgrade and treat `None` as "session gone". Handles do not
/// take part in equality: two structures holding the same data are equal
/// whichever session built them.
#[derive(Clone)]
pub struct ClientHandle(Weak<dyn Client>);

struct Detached;

impl Client for Detached {
    fn application_id(&self) -> Option<Snowflake> {
        None
    }

    fn bot_id(&self) -> Option<Snowflake> {
        None
    }

    fn total_shards(&self) -> u32 {
        1
    }

    fn is_alive(&self) -> bool {
        false
    }
}

impl ClientHandle {
    pub fn new<C: Client + 'static>(client: &Arc<C>) -> Self {
        let weak: Weak<C> = Arc::downgrade(client);
        Self(weak)
    }

    pub fn from_weak<C: Client + 'static>(weak: Weak<C>) -> Self {
        Self(weak)
    }

    /// A handle that never upgrades. Used for structures decoded outside a session.
    pub fn detached() -> Self {
        let weak: Weak<Detached> = Weak::new();
        Self(weak)
    }

    pub fn upgrade(&self) -> Option<Arc<dyn Client>> {
        self.0.upgrade().filter(|client| client.is_alive())
    }

    pub fn is_attached(&self) -> bool {
        self.upgrade().is_some()
    }
}

impl Default for ClientHandle {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
