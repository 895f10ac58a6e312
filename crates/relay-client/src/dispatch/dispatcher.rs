//! The event dispatch pipeline
//!
//! Single consumer of the session's decoded payload stream. For each
//! payload, in strict arrival order: resolve the wire tag, run the
//! registered handler (cache mutation plus event construction), then fan
//! the events out to listeners. Unknown tags, unregistered types, and
//! handler failures drop the payload and keep the pipeline running.

use std::sync::Arc;

use relay_gateway::EventEnvelope;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::ClientState;
use crate::events::{Event, EventType, ListenerRegistry};
use crate::handlers::HandlerRegistry;

/// How events are handed to the listener group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanoutMode {
    /// Listeners run on the pipeline task, preserving order across events
    #[default]
    Inline,
    /// Each event's listener group runs on its own task; slow listeners
    /// cannot stall ingestion
    Spawned,
}

/// Consumes the session's payload stream and drives handlers and listeners
pub struct Dispatcher {
    state: Arc<ClientState>,
    handlers: Arc<HandlerRegistry>,
    listeners: Arc<ListenerRegistry>,
    fanout: FanoutMode,
}

impl Dispatcher {
    /// Create a dispatcher over the given registries
    #[must_use]
    pub fn new(
        state: Arc<ClientState>,
        handlers: Arc<HandlerRegistry>,
        listeners: Arc<ListenerRegistry>,
        fanout: FanoutMode,
    ) -> Self {
        Self {
            state,
            handlers,
            listeners,
            fanout,
        }
    }

    /// Spawn the pipeline task
    pub fn spawn(self, events_rx: mpsc::Receiver<EventEnvelope>) -> JoinHandle<()> {
        tokio::spawn(self.run(events_rx))
    }

    /// Run until the session's payload stream ends
    pub async fn run(self, mut events_rx: mpsc::Receiver<EventEnvelope>) {
        while let Some(envelope) = events_rx.recv().await {
            self.process(envelope);
        }
        tracing::debug!("Dispatch pipeline ended");
    }

    /// Handle exactly one payload
    pub fn process(&self, envelope: EventEnvelope) {
        let Some(event_type) = EventType::from_str(&envelope.event_type) else {
            // forward-compatible with event types this client predates
            tracing::debug!(tag = %envelope.event_type, "Ignoring unknown event type");
            return;
        };

        let Some(handler) = self.handlers.get(event_type) else {
            tracing::debug!(event_type = %event_type, "No handler registered; ignoring");
            return;
        };

        let events = match handler.handle(&self.state, envelope.sequence, envelope.data) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    event_type = %event_type,
                    sequence = envelope.sequence,
                    error = %e,
                    "Handler failed; dropping payload"
                );
                return;
            }
        };

        for event in events {
            self.fan_out(event);
        }
    }

    fn fan_out(&self, event: Event) {
        match self.fanout {
            FanoutMode::Inline => self.listeners.dispatch(&event),
            FanoutMode::Spawned => {
                let listeners = self.listeners.clone();
                tokio::spawn(async move {
                    listeners.dispatch(&event);
                });
            }
        }
    }
}
