//! Message reaction handlers
//!
//! Reactions are not mirrored; the events expose lazy cache accessors for
//! the user and message instead.

use std::sync::Arc;

use relay_core::{ReactionEmoji, Snowflake};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{
    Event, EventContext, EventType, MessageReactionAddEvent, MessageReactionRemoveEvent,
};

use super::{GatewayHandler, HandlerError};

#[derive(Debug, Deserialize)]
struct ReactionPayload {
    user_id: Snowflake,
    channel_id: Snowflake,
    message_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    emoji: ReactionEmoji,
}

/// Handles MESSAGE_REACTION_ADD
pub struct ReactionAddHandler;

impl GatewayHandler for ReactionAddHandler {
    fn event_type(&self) -> EventType {
        EventType::MessageReactionAdd
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: ReactionPayload = serde_json::from_value(data)?;

        Ok(vec![Event::ReactionAdd(MessageReactionAddEvent {
            ctx: EventContext::new(state.clone(), sequence),
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            emoji: payload.emoji,
        })])
    }
}

/// Handles MESSAGE_REACTION_REMOVE
pub struct ReactionRemoveHandler;

impl GatewayHandler for ReactionRemoveHandler {
    fn event_type(&self) -> EventType {
        EventType::MessageReactionRemove
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: ReactionPayload = serde_json::from_value(data)?;

        Ok(vec![Event::ReactionRemove(MessageReactionRemoveEvent {
            ctx: EventContext::new(state.clone(), sequence),
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            emoji: payload.emoji,
        })])
    }
}
