//! Gateway event handlers
//!
//! A handler serves exactly one wire event type: it decodes the untyped
//! body, applies the cache mutation, and returns the domain events to fan
//! out. The registry is resolved once at startup into a lookup table; the
//! pipeline never inspects payload types at runtime.

mod ban;
mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod reaction;
mod ready;
mod typing;
mod user;
mod voice;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventType};

pub use ban::{GuildBanAddHandler, GuildBanRemoveHandler};
pub use channel::{ChannelCreateHandler, ChannelDeleteHandler, ChannelUpdateHandler};
pub use guild::{GuildCreateHandler, GuildDeleteHandler, GuildUpdateHandler};
pub use member::{MemberAddHandler, MemberRemoveHandler, MemberUpdateHandler};
pub use message::{MessageCreateHandler, MessageDeleteHandler, MessageUpdateHandler};
pub use presence::PresenceUpdateHandler;
pub use reaction::{ReactionAddHandler, ReactionRemoveHandler};
pub use ready::{ReadyHandler, ResumedHandler};
pub use typing::TypingStartHandler;
pub use user::UserUpdateHandler;
pub use voice::VoiceStateUpdateHandler;

/// Handler-level failures
///
/// Logged by the pipeline; the payload is dropped and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Payload decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One registered (decode, apply) pair for a wire event type
pub trait GatewayHandler: Send + Sync {
    /// The wire tag this handler serves
    fn event_type(&self) -> EventType;

    /// Decode the body, mutate the caches, build the domain events
    ///
    /// Must be idempotent with respect to redelivery of the same payload
    /// and must never panic on malformed input.
    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError>;
}

/// Lookup table from event type to handler, fixed before the pipeline starts
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventType, Box<dyn GatewayHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in handler registered
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ReadyHandler));
        registry.register(Box::new(ResumedHandler));
        registry.register(Box::new(GuildCreateHandler));
        registry.register(Box::new(GuildUpdateHandler));
        registry.register(Box::new(GuildDeleteHandler));
        registry.register(Box::new(ChannelCreateHandler));
        registry.register(Box::new(ChannelUpdateHandler));
        registry.register(Box::new(ChannelDeleteHandler));
        registry.register(Box::new(MemberAddHandler));
        registry.register(Box::new(MemberUpdateHandler));
        registry.register(Box::new(MemberRemoveHandler));
        registry.register(Box::new(GuildBanAddHandler));
        registry.register(Box::new(GuildBanRemoveHandler));
        registry.register(Box::new(MessageCreateHandler));
        registry.register(Box::new(MessageUpdateHandler));
        registry.register(Box::new(MessageDeleteHandler));
        registry.register(Box::new(ReactionAddHandler));
        registry.register(Box::new(ReactionRemoveHandler));
        registry.register(Box::new(PresenceUpdateHandler));
        registry.register(Box::new(TypingStartHandler));
        registry.register(Box::new(UserUpdateHandler));
        registry.register(Box::new(VoiceStateUpdateHandler));
        registry
    }

    /// Register a handler, replacing any previous one for the same type
    pub fn register(&mut self, handler: Box<dyn GatewayHandler>) {
        let event_type = handler.event_type();
        if self.handlers.insert(event_type, handler).is_some() {
            tracing::debug!(event_type = %event_type, "Replaced gateway handler");
        }
    }

    /// Look up the handler for an event type
    #[must_use]
    pub fn get(&self, event_type: EventType) -> Option<&dyn GatewayHandler> {
        self.handlers.get(&event_type).map(Box::as_ref)
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
