//! Two-level store for group-scoped entities
//!
//! Entities are keyed by (group id, entity id), e.g. members by guild or
//! messages by channel. One reader/writer lock per cache instance; every
//! accessor returns copies, never references into internal storage.

use std::collections::HashMap;

use parking_lot::RwLock;
use relay_core::Snowflake;

use crate::flags::CacheFlags;
use crate::policy::CachePolicy;

/// Thread-safe two-level cache: group id → entity id → entity
pub struct GroupedCache<T> {
    flags: CacheFlags,
    needed_flags: CacheFlags,
    policy: Option<CachePolicy<T>>,
    cache: RwLock<HashMap<Snowflake, HashMap<Snowflake, T>>>,
}

impl<T: Clone> GroupedCache<T> {
    /// Create a new grouped cache
    ///
    /// `needed_flags` names this kind's flag(s); a `put` is a no-op unless
    /// `flags` contains them and the policy (if any) admits the entity.
    #[must_use]
    pub fn new(flags: CacheFlags, needed_flags: CacheFlags, policy: Option<CachePolicy<T>>) -> Self {
        Self {
            flags,
            needed_flags,
            policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get an entity by group and id
    pub fn get(&self, group_id: Snowflake, id: Snowflake) -> Option<T> {
        self.cache
            .read()
            .get(&group_id)
            .and_then(|group| group.get(&id))
            .cloned()
    }

    /// Insert or replace an entity
    ///
    /// Rejected without touching the lock when the kind's flags are
    /// disabled or the policy declines the instance. The group bucket is
    /// created lazily.
    pub fn put(&self, group_id: Snowflake, id: Snowflake, entity: T) {
        if !self.needed_flags.is_empty() && self.flags.missing(self.needed_flags) {
            return;
        }
        if let Some(policy) = &self.policy {
            if !policy(&entity) {
                return;
            }
        }

        self.cache
            .write()
            .entry(group_id)
            .or_default()
            .insert(id, entity);
    }

    /// Remove an entity, returning it if present
    pub fn remove(&self, group_id: Snowflake, id: Snowflake) -> Option<T> {
        self.cache
            .write()
            .get_mut(&group_id)
            .and_then(|group| group.remove(&id))
    }

    /// Remove an entire group
    pub fn remove_all(&self, group_id: Snowflake) {
        self.cache.write().remove(&group_id);
    }

    /// Sweep all groups, removing entities the filter matches
    pub fn remove_if(&self, filter: impl Fn(Snowflake, &T) -> bool) {
        let mut cache = self.cache.write();
        for (group_id, group) in cache.iter_mut() {
            group.retain(|_, entity| !filter(*group_id, entity));
        }
    }

    /// Snapshot of every group as entity lists
    pub fn all(&self) -> HashMap<Snowflake, Vec<T>> {
        self.cache
            .read()
            .iter()
            .map(|(group_id, group)| (*group_id, group.values().cloned().collect()))
            .collect()
    }

    /// Snapshot of one group's entities
    pub fn group_all(&self, group_id: Snowflake) -> Vec<T> {
        self.cache
            .read()
            .get(&group_id)
            .map(|group| group.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every group keyed by entity id
    pub fn map_all(&self) -> HashMap<Snowflake, HashMap<Snowflake, T>> {
        self.cache.read().clone()
    }

    /// Snapshot of one group keyed by entity id
    pub fn map_group_all(&self, group_id: Snowflake) -> HashMap<Snowflake, T> {
        self.cache.read().get(&group_id).cloned().unwrap_or_default()
    }

    /// Find the first entity matching the filter across all groups
    pub fn find_first(&self, filter: impl Fn(Snowflake, &T) -> bool) -> Option<T> {
        let cache = self.cache.read();
        for (group_id, group) in cache.iter() {
            for entity in group.values() {
                if filter(*group_id, entity) {
                    return Some(entity.clone());
                }
            }
        }
        None
    }

    /// Find the first entity matching the filter within one group
    pub fn group_find_first(
        &self,
        group_id: Snowflake,
        filter: impl Fn(&T) -> bool,
    ) -> Option<T> {
        let cache = self.cache.read();
        cache
            .get(&group_id)
            .and_then(|group| group.values().find(|entity| filter(entity)))
            .cloned()
    }

    /// Collect every entity matching the filter across all groups
    pub fn find_all(&self, filter: impl Fn(Snowflake, &T) -> bool) -> Vec<T> {
        let cache = self.cache.read();
        let mut all = Vec::new();
        for (group_id, group) in cache.iter() {
            for entity in group.values() {
                if filter(*group_id, entity) {
                    all.push(entity.clone());
                }
            }
        }
        all
    }

    /// Collect every entity matching the filter within one group
    pub fn group_find_all(&self, group_id: Snowflake, filter: impl Fn(&T) -> bool) -> Vec<T> {
        let cache = self.cache.read();
        cache
            .get(&group_id)
            .map(|group| {
                group
                    .values()
                    .filter(|entity| filter(entity))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Visit every entity with its group id
    ///
    /// Runs under the read lock; the callback must not call back into the
    /// cache.
    pub fn for_each(&self, mut visit: impl FnMut(Snowflake, &T)) {
        let cache = self.cache.read();
        for (group_id, group) in cache.iter() {
            for entity in group.values() {
                visit(*group_id, entity);
            }
        }
    }

    /// Visit every entity within one group
    pub fn for_each_group(&self, group_id: Snowflake, mut visit: impl FnMut(&T)) {
        let cache = self.cache.read();
        if let Some(group) = cache.get(&group_id) {
            for entity in group.values() {
                visit(entity);
            }
        }
    }

    /// Total number of cached entities across all groups
    pub fn len(&self) -> usize {
        self.cache.read().values().map(HashMap::len).sum()
    }

    /// Check if the cache holds no entities
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> std::fmt::Debug for GroupedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupedCache")
            .field("flags", &self.flags)
            .field("needed_flags", &self.needed_flags)
            .field("groups", &self.cache.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn open_cache() -> GroupedCache<String> {
        GroupedCache::new(CacheFlags::all(), CacheFlags::MEMBERS, None)
    }

    const G1: Snowflake = Snowflake::new(1);
    const G2: Snowflake = Snowflake::new(2);
    const E1: Snowflake = Snowflake::new(10);
    const E2: Snowflake = Snowflake::new(11);

    #[test]
    fn test_put_get_roundtrip() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());

        assert_eq!(cache.get(G1, E1), Some("alice".to_string()));
        assert_eq!(cache.get(G1, E2), None);
        assert_eq!(cache.get(G2, E1), None);
    }

    #[test]
    fn test_put_replaces() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G1, E1, "alice2".to_string());

        assert_eq!(cache.get(G1, E1), Some("alice2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_rejected_when_flag_disabled() {
        let cache: GroupedCache<String> =
            GroupedCache::new(CacheFlags::GUILDS, CacheFlags::MEMBERS, None);
        cache.put(G1, E1, "alice".to_string());

        assert_eq!(cache.get(G1, E1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_rejected_by_policy() {
        let policy: CachePolicy<String> = Arc::new(|s: &String| !s.starts_with("bot"));
        let cache = GroupedCache::new(CacheFlags::all(), CacheFlags::MEMBERS, Some(policy));

        cache.put(G1, E1, "bot-account".to_string());
        cache.put(G1, E2, "human".to_string());

        assert_eq!(cache.get(G1, E1), None);
        assert_eq!(cache.get(G1, E2), Some("human".to_string()));
    }

    #[test]
    fn test_remove() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());

        assert_eq!(cache.remove(G1, E1), Some("alice".to_string()));
        assert_eq!(cache.remove(G1, E1), None);
        assert_eq!(cache.get(G1, E1), None);
    }

    #[test]
    fn test_remove_all() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G1, E2, "bob".to_string());
        cache.put(G2, E1, "carol".to_string());

        cache.remove_all(G1);

        assert!(cache.group_all(G1).is_empty());
        assert_eq!(cache.group_all(G2).len(), 1);
    }

    #[test]
    fn test_remove_if() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G1, E2, "bob".to_string());
        cache.put(G2, E1, "bob".to_string());

        cache.remove_if(|_, entity| entity == "bob");

        assert_eq!(cache.get(G1, E1), Some("alice".to_string()));
        assert_eq!(cache.get(G1, E2), None);
        assert_eq!(cache.get(G2, E1), None);
    }

    #[test]
    fn test_enumeration_snapshots() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G2, E1, "bob".to_string());

        let all = cache.all();
        assert_eq!(all.len(), 2);

        let map = cache.map_group_all(G1);
        assert_eq!(map.get(&E1), Some(&"alice".to_string()));

        // mutating after the snapshot does not affect the returned copy
        cache.remove_all(G1);
        assert_eq!(all[&G1].len(), 1);
    }

    #[test]
    fn test_find() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G2, E1, "bob".to_string());

        assert_eq!(
            cache.find_first(|_, entity| entity.starts_with('b')),
            Some("bob".to_string())
        );
        assert_eq!(cache.group_find_first(G1, |entity| entity == "alice"), Some("alice".to_string()));
        assert!(cache.group_find_first(G2, |entity| entity == "alice").is_none());
        assert_eq!(cache.find_all(|_, _| true).len(), 2);
        assert_eq!(cache.group_find_all(G1, |_| true).len(), 1);
    }

    #[test]
    fn test_for_each() {
        let cache = open_cache();
        cache.put(G1, E1, "alice".to_string());
        cache.put(G1, E2, "bob".to_string());

        let mut seen = 0;
        cache.for_each(|group_id, _| {
            assert_eq!(group_id, G1);
            seen += 1;
        });
        assert_eq!(seen, 2);

        let mut group_seen = 0;
        cache.for_each_group(G1, |_| group_seen += 1);
        assert_eq!(group_seen, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache = Arc::new(open_cache());
        let mut tasks = Vec::new();

        for worker in 0..8i64 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..200i64 {
                    let group = Snowflake::new(worker % 2);
                    let id = Snowflake::new(i % 20);
                    cache.put(group, id, format!("value-{worker}-{i}"));
                    let got = cache.get(group, id);
                    // either absent (raced with remove_all) or a complete value
                    if let Some(value) = got {
                        assert!(value.starts_with("value-"));
                    }
                    if i % 50 == 0 {
                        cache.remove_all(group);
                    }
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }
    }
}
