//! Channel create/update/delete handlers

use std::sync::Arc;

use relay_core::Channel;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{
    ChannelCreateEvent, ChannelDeleteEvent, ChannelUpdateEvent, Event, EventContext, EventType,
};

use super::{GatewayHandler, HandlerError};

/// Handles CHANNEL_CREATE
pub struct ChannelCreateHandler;

impl GatewayHandler for ChannelCreateHandler {
    fn event_type(&self) -> EventType {
        EventType::ChannelCreate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let channel: Channel = serde_json::from_value(data)?;
        state.caches().channels().put(channel.id, channel.clone());

        Ok(vec![Event::ChannelCreate(ChannelCreateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            channel,
        })])
    }
}

/// Handles CHANNEL_UPDATE
pub struct ChannelUpdateHandler;

impl GatewayHandler for ChannelUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::ChannelUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let channel: Channel = serde_json::from_value(data)?;
        let old = state.caches().channels().get(channel.id);
        state.caches().channels().put(channel.id, channel.clone());

        Ok(vec![Event::ChannelUpdate(ChannelUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            channel,
            old,
        })])
    }
}

/// Handles CHANNEL_DELETE: also drops the channel's message bucket
pub struct ChannelDeleteHandler;

impl GatewayHandler for ChannelDeleteHandler {
    fn event_type(&self) -> EventType {
        EventType::ChannelDelete
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let channel: Channel = serde_json::from_value(data)?;
        state.caches().channels().remove(channel.id);
        state.caches().messages().remove_all(channel.id);

        Ok(vec![Event::ChannelDelete(ChannelDeleteEvent {
            ctx: EventContext::new(state.clone(), sequence),
            channel,
        })])
    }
}
