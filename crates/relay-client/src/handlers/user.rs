//! User update handler

use std::sync::Arc;

use relay_core::User;
use serde_json::Value;

use crate::client::ClientState;
use crate::events::{Event, EventContext, EventType, UserUpdateEvent};

use super::{GatewayHandler, HandlerError};

/// Handles USER_UPDATE
pub struct UserUpdateHandler;

impl GatewayHandler for UserUpdateHandler {
    fn event_type(&self) -> EventType {
        EventType::UserUpdate
    }

    fn handle(
        &self,
        state: &Arc<ClientState>,
        sequence: u64,
        data: Value,
    ) -> Result<Vec<Event>, HandlerError> {
        let user: User = serde_json::from_value(data)?;
        let old = state.caches().users().get(user.id);
        state.caches().users().put(user.id, user.clone());

        Ok(vec![Event::UserUpdate(UserUpdateEvent {
            ctx: EventContext::new(state.clone(), sequence),
            user,
            old,
        })])
    }
}
