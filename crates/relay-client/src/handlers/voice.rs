//! Voice state update handler

use std::sync::Arc;

use relay_core::VoiceState;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, VoiceStateUpdateEvent};

use super::{GatewayHandler, HandlerError};

/// Handles VOICE_STATE_UPDATE
///
/// A null channel means the user left voice, which removes the mirror
/// entry instead of replacing it.
pub struct VoiceStateUpdateHandler;

impl GatewayHandler for VoiceStateUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::VoiceStateUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let voice_state: VoiceState = serde_json::from_value(data)?;
        let caches = state.caches();

        let old = caches
            .voice_states()
            .get(voice_state.guild_id, voice_state.user_id);
        if voice_state.is_connected() {
            caches
                .voice_states()
                .put(voice_state.guild_id, voice_state.user_id, voice_state.clone());
        } else {
            caches
                .voice_states()
                .remove(voice_state.guild_id, voice_state.user_id);
        }

        Ok(vec![Event::VoiceStateUpdate(VoiceStateUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            state: voice_state,
            old,
        })])
    }
}
