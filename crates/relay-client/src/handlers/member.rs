//! Guild member add/update/remove handlers

use std::sync::Arc;

use relay_core::{GuildMember, Snowflake, User};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{
    Event, EventContext, EventType, MemberJoinEvent, MemberLeaveEvent, MemberUpdateEvent,
};

use super::{GatewayHandler, HandlerError};

/// Handles GUILD_MEMBER_ADD
pub struct MemberAddHandler;

impl GatewayHandler for MemberAddHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildMemberAdd
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let member: GuildMember = serde_json::from_value(data)?;
        let guild_id = member.guild_id;
        let caches = state.caches();

        caches.users().put(member.user.id, member.user.clone());
        caches.members().put(guild_id, member.user.id, member.clone());

        Ok(vec![Event::MemberJoin(MemberJoinEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id,
            member,
        })])
    }
}

/// Handles GUILD_MEMBER_UPDATE
pub struct MemberUpdateHandler;

impl GatewayHandler for MemberUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildMemberUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let member: GuildMember = serde_json::from_value(data)?;
        let guild_id = member.guild_id;
        let caches = state.caches();

        let old = caches.members().get(guild_id, member.user.id);
        caches.users().put(member.user.id, member.user.clone());
        caches.members().put(guild_id, member.user.id, member.clone());

        Ok(vec![Event::MemberUpdate(MemberUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id,
            member,
            old,
        })])
    }
}

#[derive(Debug, Deserialize)]
struct MemberRemovePayload {
    guild_id: Snowflake,
    user: User,
}

/// Handles GUILD_MEMBER_REMOVE
pub struct MemberRemoveHandler;

impl GatewayHandler for MemberRemoveHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildMemberRemove
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: MemberRemovePayload = serde_json::from_value(data)?;
        let caches = state.caches();

        let member = caches.members().remove(payload.guild_id, payload.user.id);
        caches.users().put(payload.user.id, payload.user.clone());

        Ok(vec![Event::MemberLeave(MemberLeaveEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id: payload.guild_id,
            user: payload.user,
            member,
        })])
    }
}
