//! READY and RESUMED handlers

use std::sync::Arc;

use relay_core::{Guild, User};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, ReadyEvent, ResumedEvent};

use super::{GatewayHandler, HandlerError};

#[derive(Debug, Deserialize)]
struct ReadyPayload {
    session_id: String,
    user: User,
    #[serde(default)]
    guilds: Vec<Guild>,
}

/// Handles READY: caches the self user and the initial guild burst
pub struct ReadyHandler;

impl GatewayHandler for ReadyHandler {
    fn event_type(&self) -> EventType {
        EventType::Ready
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: ReadyPayload = serde_json::from_value(data)?;

        state.caches().users().put(payload.user.id, payload.user.clone());

        let mut guild_ids = Vec::with_capacity(payload.guilds.len());
        for guild in payload.guilds {
            guild_ids.push(guild.id);
            state.caches().guilds().put(guild.id, guild);
        }

        Ok(vec![Event::Ready(ReadyEvent {
            ctx: EventContext::new(state.clone(), sequence),
            session_id: payload.session_id,
            user: payload.user,
            guild_ids,
        })])
    }
}

/// Handles RESUMED: the replay finished, no cache work to do
pub struct ResumedHandler;

impl GatewayHandler for ResumedHandler {
    fn event_type(&self) -> EventType {
        EventType::Resumed
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        _data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        Ok(vec![Event::Resumed(ResumedEvent {
            ctx: EventContext::new(state.clone(), sequence),
        })])
    }
}
