//! Presence update handler

use std::sync::Arc;

use relay_core::Presence;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, PresenceUpdateEvent};

use super::{GatewayHandler, HandlerError};

/// Handles PRESENCE_UPDATE
pub struct PresenceUpdateHandler;

impl GatewayHandler for PresenceUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::PresenceUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let presence: Presence = serde_json::from_value(data)?;
        state
            .caches()
            .presences()
            .put(presence.guild_id, presence.user_id, presence.clone());

        Ok(vec![Event::PresenceUpdate(PresenceUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            presence,
        })])
    }
}
