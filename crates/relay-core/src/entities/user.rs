//! User entity - a user account as mirrored from the service

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

bitflags! {
    /// Public badges carried on a user account
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UserFlags: u64 {
        const STAFF               = 1 << 0;
        const PARTNER             = 1 << 1;
        const BUG_HUNTER_LEVEL_1  = 1 << 3;
        const EARLY_SUPPORTER     = 1 << 9;
        const TEAM_USER           = 1 << 10;
        const BUG_HUNTER_LEVEL_2  = 1 << 14;
        const VERIFIED_BOT        = 1 << 16;
        const VERIFIED_DEVELOPER  = 1 << 17;
        const CERTIFIED_MODERATOR = 1 << 18;
    }
}

impl Serialize for UserFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for UserFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// User entity as received in gateway payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub public_flags: UserFlags,
}

impl User {
    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// Get the chat mention string for this user
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Get avatar URL or default avatar URL
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!("/avatars/{}/{}.png", self.id, hash),
            None => format!("/embed/avatars/{}.png", self.default_avatar_index()),
        }
    }

    /// Get default avatar index (0-4) based on discriminator
    fn default_avatar_index(&self) -> u8 {
        self.discriminator.parse::<u16>().unwrap_or(0) as u8 % 5
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot
    }

    /// Check if user is a system account
    #[inline]
    pub fn is_system(&self) -> bool {
        self.system
    }
}
