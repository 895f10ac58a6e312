//! Role entity - a guild role

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Guild role entity as received in gateway payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// Get the chat mention string for this role
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}
