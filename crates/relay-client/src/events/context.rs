//! Generic event context
//!
//! Embedded by value in every event variant. Carries the handle listeners
//! use for lazy cache lookups plus the sequence number of the originating
//! dispatch.

use std::sync::Arc;

use relay_cache::Caches;

use crate::client::ClientState;
use crate::rest::RestClient;

/// Shared context attached to every domain event
#[derive(Clone)]
pub struct EventContext {
    state: Arc<ClientState>,
    sequence: u64,
}

impl EventContext {
    /// Create a context for one dispatch
    #[must_use]
    pub fn new(state: Arc<ClientState>, sequence: u64) -> Self {
        Self { state, sequence }
    }

    /// Sequence number of the dispatch this event was derived from
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The client's entity caches
    #[must_use]
    pub fn caches(&self) -> &Caches {
        self.state.caches()
    }

    /// The REST collaborator, for async follow-up lookups
    #[must_use]
    pub fn rest(&self) -> &Arc<dyn RestClient> {
        self.state.rest()
    }
}

impl std::fmt::Debug for EventContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("sequence", &self.sequence)
            .finish()
    }
}
