//! Channel entity - a text, voice, or category channel

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel kinds supported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Text,
    Voice,
    Category,
    Dm,
}

/// Channel entity as received in gateway payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub position: Option<i32>,
}

impl Channel {
    /// Check if this is a guild channel (as opposed to a DM)
    #[inline]
    pub fn is_guild_channel(&self) -> bool {
        self.guild_id.is_some()
    }

    /// Check if messages can be sent in this channel
    #[inline]
    pub fn is_text_based(&self) -> bool {
        matches!(self.kind, ChannelType::Text | ChannelType::Dm)
    }

    /// Get the chat mention string for this channel
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_wire_decode() {
        let json = r#"{
            "id": "55",
            "type": "text",
            "guild_id": "1",
            "name": "general",
            "position": 0
        }"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.kind, ChannelType::Text);
        assert!(channel.is_guild_channel());
        assert!(channel.is_text_based());
    }

    #[test]
    fn test_dm_channel() {
        let json = r#"{"id": "77", "type": "dm"}"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert!(!channel.is_guild_channel());
        assert!(channel.is_text_based());
    }

    #[test]
    fn test_channel_mention() {
        let json = r#"{"id": "55", "type": "voice"}"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.mention(), "<#55>");
        assert!(!channel.is_text_based());
    }
}
