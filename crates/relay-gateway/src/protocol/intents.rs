//! Gateway intents
//!
//! Declared during identify; the server only streams event groups the
//! client asked for.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Event groups a session subscribes to during identify
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intents: u32 {
        const GUILDS                  = 1 << 0;
        const GUILD_MEMBERS           = 1 << 1;
        const GUILD_BANS              = 1 << 2;
        const GUILD_VOICE_STATES      = 1 << 7;
        const GUILD_PRESENCES         = 1 << 8;
        const GUILD_MESSAGES          = 1 << 9;
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        const GUILD_MESSAGE_TYPING    = 1 << 11;
        const DIRECT_MESSAGES         = 1 << 12;
        const DIRECT_MESSAGE_REACTIONS = 1 << 13;

        /// Everything except the high-volume presence stream
        const DEFAULT = Self::GUILDS.bits()
            | Self::GUILD_MEMBERS.bits()
            | Self::GUILD_BANS.bits()
            | Self::GUILD_VOICE_STATES.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits()
            | Self::DIRECT_MESSAGES.bits()
            | Self::DIRECT_MESSAGE_REACTIONS.bits();
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
