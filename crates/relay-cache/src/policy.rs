//! Admission policies
//!
//! A policy decides whether a specific entity instance is worth retaining
//! once its kind's flag is enabled. Policies run on every `put`, outside the
//! cache lock, and must be cheap and side-effect free.

use std::sync::Arc;

/// Per-entity admission predicate
pub type CachePolicy<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Policy that admits every entity
#[must_use]
pub fn cache_all<T>() -> CachePolicy<T> {
    Arc::new(|_| true)
}

/// Policy that rejects every entity
#[must_use]
pub fn cache_none<T>() -> CachePolicy<T> {
    Arc::new(|_| false)
}

/// Combine policies; admits only entities every policy admits
#[must_use]
pub fn all_of<T: 'static>(policies: Vec<CachePolicy<T>>) -> CachePolicy<T> {
    Arc::new(move |entity| policies.iter().all(|policy| policy(entity)))
}

/// Combine policies; admits entities any policy admits
#[must_use]
pub fn any_of<T: 'static>(policies: Vec<CachePolicy<T>>) -> CachePolicy<T> {
    Arc::new(move |entity| policies.iter().any(|policy| policy(entity)))
}
