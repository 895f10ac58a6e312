//! Message entity and reaction emoji

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Message entity as received in gateway payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: bool,
}

impl Message {
    /// Check if the message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Check if the message was sent in a DM
    #[inline]
    pub fn is_dm(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// The emoji part of a message reaction
///
/// Custom emoji carry an id; unicode emoji only a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEmoji {
    #[serde(default)]
    pub id: Option<Snowflake>,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl ReactionEmoji {
    /// Check if this is a custom (uploaded) emoji
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.id.is_some()
    }

    /// The reaction identity the REST surface expects: `name:id` for custom
    /// emoji, the bare name for unicode
    pub fn api_name(&self) -> String {
        match self.id {
            Some(id) => format!("{}:{}", self.name, id),
            None => self.name.clone(),
        }
    }
}
