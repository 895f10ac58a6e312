//! Cache flags - which entity kinds are mirrored locally

use bitflags::bitflags;

bitflags! {
    /// Entity kinds the client mirrors into its caches
    ///
    /// A `put` for a kind whose flag is disabled is a no-op; events for that
    /// kind still reach listeners.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CacheFlags: u32 {
        const GUILDS       = 1 << 0;
        const CHANNELS     = 1 << 1;
        const USERS        = 1 << 2;
        const MEMBERS      = 1 << 3;
        const ROLES        = 1 << 4;
        const MESSAGES     = 1 << 5;
        const VOICE_STATES = 1 << 6;
        const PRESENCES    = 1 << 7;
        const BANS         = 1 << 8;

        /// The kinds most bots need: structural state without the
        /// high-churn message/presence traffic
        const DEFAULT = Self::GUILDS.bits()
            | Self::CHANNELS.bits()
            | Self::USERS.bits()
            | Self::MEMBERS.bits()
            | Self::ROLES.bits();
    }
}

impl CacheFlags {
    /// Check if any of the given flags are missing from this set
    #[inline]
    #[must_use]
    pub fn missing(&self, needed: CacheFlags) -> bool {
        !self.contains(needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let flags = CacheFlags::DEFAULT;
        assert!(flags.contains(CacheFlags::GUILDS));
        assert!(flags.contains(CacheFlags::MEMBERS));
        assert!(!flags.contains(CacheFlags::MESSAGES));
        assert!(!flags.contains(CacheFlags::PRESENCES));
    }

    #[test]
    fn test_missing() {
        let flags = CacheFlags::GUILDS | CacheFlags::USERS;
        assert!(!flags.missing(CacheFlags::GUILDS));
        assert!(flags.missing(CacheFlags::MEMBERS));
        assert!(flags.missing(CacheFlags::GUILDS | CacheFlags::MEMBERS));
        assert!(!CacheFlags::all().missing(CacheFlags::BANS));
    }
}
