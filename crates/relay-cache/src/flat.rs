//! Single-level store for ungrouped entities
//!
//! Users, guilds, and channels live in a flat keyspace; admission follows
//! the same flags-then-policy discipline as the grouped cache.

use std::collections::HashMap;

use parking_lot::RwLock;
use relay_core::Snowflake;

use crate::flags::CacheFlags;
use crate::policy::CachePolicy;

/// Thread-safe flat cache: entity id → entity
pub struct FlatCache<T> {
    flags: CacheFlags,
    needed_flags: CacheFlags,
    policy: Option<CachePolicy<T>>,
    cache: RwLock<HashMap<Snowflake, T>>,
}

impl<T: Clone> FlatCache<T> {
    /// Create a new flat cache
    #[must_use]
    pub fn new(flags: CacheFlags, needed_flags: CacheFlags, policy: Option<CachePolicy<T>>) -> Self {
        Self {
            flags,
            needed_flags,
            policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get an entity by id
    pub fn get(&self, id: Snowflake) -> Option<T> {
        self.cache.read().get(&id).cloned()
    }

    /// Insert or replace an entity, subject to flags and policy
    pub fn put(&self, id: Snowflake, entity: T) {
        if !self.needed_flags.is_empty() && self.flags.missing(self.needed_flags) {
            return;
        }
        if let Some(policy) = &self.policy {
            if !policy(&entity) {
                return;
            }
        }

        self.cache.write().insert(id, entity);
    }

    /// Remove an entity, returning it if present
    pub fn remove(&self, id: Snowflake) -> Option<T> {
        self.cache.write().remove(&id)
    }

    /// Remove entities the filter matches
    pub fn remove_if(&self, filter: impl Fn(&T) -> bool) {
        self.cache.write().retain(|_, entity| !filter(entity));
    }

    /// Snapshot of all entities
    pub fn all(&self) -> Vec<T> {
        self.cache.read().values().cloned().collect()
    }

    /// Find the first entity matching the filter
    pub fn find_first(&self, filter: impl Fn(&T) -> bool) -> Option<T> {
        let cache = self.cache.read();
        cache.values().find(|entity| filter(entity)).cloned()
    }

    /// Collect every entity matching the filter
    pub fn find_all(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.cache
            .read()
            .values()
            .filter(|entity| filter(entity))
            .cloned()
            .collect()
    }

    /// Visit every entity
    pub fn for_each(&self, mut visit: impl FnMut(&T)) {
        let cache = self.cache.read();
        for entity in cache.values() {
            visit(entity);
        }
    }

    /// Number of cached entities
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache holds no entities
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl<T> std::fmt::Debug for FlatCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatCache")
            .field("flags", &self.flags)
            .field("needed_flags", &self.needed_flags)
            .field("entities", &self.cache.read().len())
            .finish()
    }
}
