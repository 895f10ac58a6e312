//! Guild ban add/remove handlers

use std::sync::Arc;

use relay_core::{Ban, Snowflake, User};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, GuildBanEvent, GuildUnbanEvent};

use super::{GatewayHandler, HandlerError};

#[derive(Debug, Deserialize)]
struct BanPayload {
    guild_id: Snowflake,
    user: User,
}

/// Handles GUILD_BAN_ADD
pub struct GuildBanAddHandler;

impl GatewayHandler for GuildBanAddHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildBanAdd
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: BanPayload = serde_json::from_value(data)?;
        let caches = state.caches();

        caches.users().put(payload.user.id, payload.user.clone());
        caches.bans().put(
            payload.guild_id,
            payload.user.id,
            Ban {
                user: payload.user.clone(),
                guild_id: payload.guild_id,
                reason: None,
            },
        );

        Ok(vec![Event::GuildBan(GuildBanEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id: payload.guild_id,
            user: payload.user,
        })])
    }
}

/// Handles GUILD_BAN_REMOVE
pub struct GuildBanRemoveHandler;

impl GatewayHandler for GuildBanRemoveHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildBanRemove
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: BanPayload = serde_json::from_value(data)?;
        let caches = state.caches();

        caches.users().put(payload.user.id, payload.user.clone());
        caches.bans().remove(payload.guild_id, payload.user.id);

        Ok(vec![Event::GuildUnban(GuildUnbanEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id: payload.guild_id,
            user: payload.user,
        })])
    }
}
