//! Voice state entity - a user's voice connection in a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Voice state entity as received in gateway payloads
///
/// A null `channel_id` means the user disconnected from voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    #[serde(default)]
    pub guild_id: Snowflake,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub session_id: String,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
}

impl VoiceState {
    /// Check if the user is connected to a voice channel
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.channel_id.is_some()
    }
}
