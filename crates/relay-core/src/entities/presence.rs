//! Presence entity - a user's online status in a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Online status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

/// Presence entity as received in gateway payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub user_id: Snowflake,
    #[serde(default)]
    pub guild_id: Snowflake,
    #[serde(default)]
    pub status: OnlineStatus,
}

impl Presence {
    /// Check if the user is reachable (any non-offline status)
    #[inline]
    pub fn is_online(&self) -> bool {
        self.status != OnlineStatus::Offline
    }
}
