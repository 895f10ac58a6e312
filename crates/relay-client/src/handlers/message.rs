//! Message create/update/delete handlers

use std::sync::Arc;

use relay_core::{Message, Snowflake};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{
    Event, EventContext, EventType, MessageCreateEvent, MessageDeleteEvent, MessageUpdateEvent,
};

use super::{GatewayHandler, HandlerError};

/// Handles MESSAGE_CREATE
pub struct MessageCreateHandler;

impl GatewayHandler for MessageCreateHandler {
    fn event_type(&self) -> EventType {
        EventType::MessageCreate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let message: Message = serde_json::from_value(data)?;
        let caches = state.caches();

        caches.users().put(message.author.id, message.author.clone());
        caches.messages().put(message.channel_id, message.id, message.clone());

        Ok(vec![Event::MessageCreate(MessageCreateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            message,
        })])
    }
}

/// Handles MESSAGE_UPDATE
pub struct MessageUpdateHandler;

impl GatewayHandler for MessageUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::MessageUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let message: Message = serde_json::from_value(data)?;
        let caches = state.caches();

        let old = caches.messages().get(message.channel_id, message.id);
        caches.messages().put(message.channel_id, message.id, message.clone());

        Ok(vec![Event::MessageUpdate(MessageUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            message,
            old,
        })])
    }
}

#[derive(Debug, Deserialize)]
struct MessageDeletePayload {
    id: Snowflake,
    channel_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

/// Handles MESSAGE_DELETE
pub struct MessageDeleteHandler;

impl GatewayHandler for MessageDeleteHandler {
    fn event_type(&self) -> EventType {
        EventType::MessageDelete
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: MessageDeletePayload = serde_json::from_value(data)?;

        let message = state.caches().messages().remove(payload.channel_id, payload.id);

        Ok(vec![Event::MessageDelete(MessageDeleteEvent {
            ctx: EventContext::new(state.clone(), sequence),
            message_id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            message,
        })])
    }
}
