//! Typing start handler

use std::sync::Arc;

use relay_core::Snowflake;
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, TypingStartEvent};

use super::{GatewayHandler, HandlerError};

#[derive(Debug, Deserialize)]
struct TypingStartPayload {
    channel_id: Snowflake,
    user_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

/// Handles TYPING_START; nothing is cached
pub struct TypingStartHandler;

impl GatewayHandler for TypingStartHandler {
    fn event_type(&self) -> EventType {
        EventType::TypingStart
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: TypingStartPayload = serde_json::from_value(data)?;

        Ok(vec![Event::TypingStart(TypingStartEvent {
            ctx: EventContext::new(state.clone(), sequence),
            channel_id: payload.channel_id,
            user_id: payload.user_id,
            guild_id: payload.guild_id,
        })])
    }
}
