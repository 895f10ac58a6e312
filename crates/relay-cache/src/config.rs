//! Cache configuration
//!
//! Fixed at client construction; the caches read it on every `put` and
//! never mutate it.

use relay_core::{GuildMember, Message, User};

use crate::flags::CacheFlags;
use crate::policy::CachePolicy;

/// Immutable cache configuration: enabled kinds plus per-kind policies
#[derive(Clone, Default)]
pub struct CacheConfig {
    pub(crate) flags: CacheFlags,
    pub(crate) member_policy: Option<CachePolicy<GuildMember>>,
    pub(crate) message_policy: Option<CachePolicy<Message>>,
    pub(crate) user_policy: Option<CachePolicy<User>>,
}

impl CacheConfig {
    /// Create a configuration with the default flag set and no policies
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: CacheFlags::DEFAULT,
            ..Self::default()
        }
    }

    /// Set which entity kinds are mirrored
    #[must_use]
    pub fn with_flags(mut self, flags: CacheFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the member admission policy
    #[must_use]
    pub fn with_member_policy(mut self, policy: CachePolicy<GuildMember>) -> Self {
        self.member_policy = Some(policy);
        self
    }

    /// Set the message admission policy
    #[must_use]
    pub fn with_message_policy(mut self, policy: CachePolicy<Message>) -> Self {
        self.message_policy = Some(policy);
        self
    }

    /// Set the user admission policy
    #[must_use]
    pub fn with_user_policy(mut self, policy: CachePolicy<User>) -> Self {
        self.user_policy = Some(policy);
        self
    }

    /// Get the configured flags
    #[must_use]
    pub fn flags(&self) -> CacheFlags {
        self.flags
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("flags", &self.flags)
            .field("member_policy", &self.member_policy.is_some())
            .field("message_policy", &self.message_policy.is_some())
            .field("user_policy", &self.user_policy.is_some())
            .finish()
    }
}
