//! Shared client state
//!
//! What handlers and events can reach: the entity caches and the REST
//! collaborator. One instance per client, shared by Arc.

use std::sync::Arc;

use relay_cache::{CacheConfig, Caches};

use crate::rest::RestClient;

/// The state shared between the dispatch pipeline, events, and the facade
pub struct ClientState {
    caches: Caches,
    rest: Arc<dyn RestClient>,
}

impl ClientState {
    /// Build the state from an immutable cache configuration
    #[must_use]
    pub fn new(cache_config: &CacheConfig, rest: Arc<dyn RestClient>) -> Self {
        Self {
            caches: Caches::new(cache_config),
            rest,
        }
    }

    /// The entity caches
    #[must_use]
    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    /// The REST collaborator
    #[must_use]
    pub fn rest(&self) -> &Arc<dyn RestClient> {
        &self.rest
    }
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("caches", &self.caches)
            .finish()
    }
}
