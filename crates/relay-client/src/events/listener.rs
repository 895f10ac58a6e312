//! Listener registry
//!
//! External callbacks keyed by event type or registered as a catch-all.
//! Registration and removal are safe while dispatch is running, and a
//! panicking listener is isolated so it cannot stall ingestion.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::{Event, EventType};

/// Handle returned from registration, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

/// A domain-event callback
pub trait EventListener: Send + Sync {
    /// Called once per dispatched event, in arrival order
    fn on_event(&self, event: &Event);
}

/// Adapter turning a closure into an [`EventListener`]
pub struct FnListener<F>(pub F);

impl<F> EventListener for FnListener<F>
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        (self.0)(event);
    }
}

struct Registration {
    filter: Option<EventType>,
    listener: Arc<dyn EventListener>,
}

/// Concurrent listener registry
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<ListenerId, Registration>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catch-all listener
    pub fn add(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        self.insert(None, listener)
    }

    /// Register a listener for one event type
    pub fn add_for(&self, event_type: EventType, listener: Arc<dyn EventListener>) -> ListenerId {
        self.insert(Some(event_type), listener)
    }

    /// Remove a listener; returns whether it was registered
    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver one event to every matching listener
    ///
    /// Listeners are snapshotted first so callbacks may register or remove
    /// listeners without deadlocking. A panic in one listener is caught and
    /// logged; the others still run.
    pub fn dispatch(&self, event: &Event) {
        let event_type = event.event_type();
        let matching: Vec<Arc<dyn EventListener>> = self
            .listeners
            .iter()
            .filter(|entry| entry.filter.is_none() || entry.filter == Some(event_type))
            .map(|entry| entry.listener.clone())
            .collect();

        for listener in matching {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(
                    event_type = %event_type,
                    panic = %reason,
                    "Listener panicked; isolating it from the pipeline"
                );
            }
        }
    }

    fn insert(&self, filter: Option<EventType>, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.listeners.insert(id, Registration { filter, listener });
        id
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
