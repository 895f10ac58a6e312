//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Guild member entity as received in gateway payloads
///
/// Member payloads embed the full user object; `guild_id` is present on
/// gateway member events but absent inside GUILD_CREATE member lists, so it
/// defaults to zero and handlers fill it from the surrounding payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    pub user: User,
    #[serde(default)]
    pub guild_id: Snowflake,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
}

impl GuildMember {
    /// Get display name (nickname if set, otherwise the username)
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }

    /// Get number of roles
    #[inline]
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
