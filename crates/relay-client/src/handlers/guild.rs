//! Guild create/update/delete handlers

use std::sync::Arc;

use relay_core::{Channel, Guild, GuildMember, Role, Snowflake};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{
    Event, EventContext, EventType, GuildCreateEvent, GuildDeleteEvent, GuildUpdateEvent,
};

use super::{GatewayHandler, HandlerError};

/// GUILD_CREATE carries the guild plus the initial state burst for it
#[derive(Debug, Deserialize)]
struct GuildCreatePayload {
    #[serde(flatten)]
    guild: Guild,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    members: Vec<GuildMember>,
    #[serde(default)]
    roles: Vec<Role>,
}

/// Handles GUILD_CREATE: mirrors the guild and everything nested in it
pub struct GuildCreateHandler;

impl GatewayHandler for GuildCreateHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildCreate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: GuildCreatePayload = serde_json::from_value(data)?;
        let guild_id = payload.guild.id;
        let caches = state.caches();

        caches.guilds().put(guild_id, payload.guild.clone());

        // nested objects omit guild_id on the wire; fill it in before caching
        for mut channel in payload.channels {
            channel.guild_id.get_or_insert(guild_id);
            caches.channels().put(channel.id, channel);
        }
        for mut member in payload.members {
            if member.guild_id.is_zero() {
                member.guild_id = guild_id;
            }
            caches.users().put(member.user.id, member.user.clone());
            caches.members().put(guild_id, member.user.id, member);
        }
        for mut role in payload.roles {
            if role.guild_id.is_zero() {
                role.guild_id = guild_id;
            }
            caches.roles().put(guild_id, role.id, role);
        }

        Ok(vec![Event::GuildCreate(GuildCreateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild: payload.guild,
        })])
    }
}

/// Handles GUILD_UPDATE
pub struct GuildUpdateHandler;

impl GatewayHandler for GuildUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let guild: Guild = serde_json::from_value(data)?;
        let old = state.caches().guilds().get(guild.id);
        state.caches().guilds().put(guild.id, guild.clone());

        Ok(vec![Event::GuildUpdate(GuildUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild,
            old,
        })])
    }
}

#[derive(Debug, Deserialize)]
struct GuildDeletePayload {
    id: Snowflake,
    #[serde(default)]
    unavailable: bool,
}

/// Handles GUILD_DELETE: an outage keeps the mirror, a removal sweeps it
pub struct GuildDeleteHandler;

impl GatewayHandler for GuildDeleteHandler {
    fn event_type(&self) -> EventType {
        EventType::GuildDelete
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let payload: GuildDeletePayload = serde_json::from_value(data)?;

        if payload.unavailable {
            if let Some(mut guild) = state.caches().guilds().get(payload.id) {
                guild.unavailable = true;
                state.caches().guilds().put(payload.id, guild);
            }
        } else {
            state.caches().remove_guild(payload.id);
        }

        Ok(vec![Event::GuildDelete(GuildDeleteEvent {
            ctx: EventContext::new(state.clone(), sequence),
            guild_id: payload.id,
            unavailable: payload.unavailable,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use serde_json::json;

    fn create_payload() -> Value {
        json!({
            "id": "10",
            "name": "guild",
            "owner_id": "1",
            "channels": [{"id": "50", "type": "text", "name": "general"}],
            "members": [
                {"user": {"id": "200", "username": "m"}, "joined_at": "2024-06-01T12:00:00Z"}
            ],
            "roles": [{"id": "7", "name": "mod"}]
        })
    }

    #[test]
    fn test_guild_create_mirrors_nested_state() {
        let state = test_support::state();
        let events = GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();

        assert!(matches!(&events[0], Event::GuildCreate(_)));

        let guild_id = Snowflake::new(10);
        let caches = state.caches();
        assert!(caches.guilds().get(guild_id).is_some());

        let channel = caches.channels().get(Snowflake::new(50)).unwrap();
        assert_eq!(channel.guild_id, Some(guild_id));

        let member = caches.members().get(guild_id, Snowflake::new(200)).unwrap();
        assert_eq!(member.guild_id, guild_id);
        assert!(caches.users().get(Snowflake::new(200)).is_some());

        let role = caches.roles().get(guild_id, Snowflake::new(7)).unwrap();
        assert_eq!(role.guild_id, guild_id);
    }

    #[test]
    fn test_guild_create_is_idempotent() {
        let state = test_support::state();
        GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();
        GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();

        assert_eq!(state.caches().members().len(), 1);
        assert_eq!(state.caches().roles().len(), 1);
    }

    #[test]
    fn test_guild_update_carries_old_value() {
        let state = test_support::state();
        GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();

        let events = GuildUpdateHandler
            .handle(&state, 2, json!({"id": "10", "name": "renamed", "owner_id": "1"}))
            .unwrap();

        let Event::GuildUpdate(update) = &events[0] else {
            panic!("expected guild update");
        };
        assert_eq!(update.guild.name, "renamed");
        assert_eq!(update.old.as_ref().unwrap().name, "guild");
        assert_eq!(
            state.caches().guilds().get(Snowflake::new(10)).unwrap().name,
            "renamed"
        );
    }

    #[test]
    fn test_guild_delete_sweeps_mirror() {
        let state = test_support::state();
        GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();

        GuildDeleteHandler
            .handle(&state, 2, json!({"id": "10"}))
            .unwrap();

        let caches = state.caches();
        assert!(caches.guilds().get(Snowflake::new(10)).is_none());
        assert!(caches.channels().get(Snowflake::new(50)).is_none());
        assert!(caches.members().group_all(Snowflake::new(10)).is_empty());
    }

    #[test]
    fn test_guild_outage_keeps_mirror() {
        let state = test_support::state();
        GuildCreateHandler.handle(&state, 1, create_payload()).unwrap();

        GuildDeleteHandler
            .handle(&state, 2, json!({"id": "10", "unavailable": true}))
            .unwrap();

        let guild = state.caches().guilds().get(Snowflake::new(10)).unwrap();
        assert!(guild.unavailable);
        assert!(!state.caches().members().group_all(Snowflake::new(10)).is_empty());
    }
}
