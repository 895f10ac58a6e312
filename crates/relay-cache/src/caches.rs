//! Aggregated cache view
//!
//! One instance per client, owning every per-kind store. Members, roles,
//! voice states, presences, and bans are grouped by guild; messages by
//! channel; users, guilds, and channels are flat.

use relay_core::{Ban, Channel, Guild, GuildMember, Message, Presence, Role, User, VoiceState};

use crate::config::CacheConfig;
use crate::flags::CacheFlags;
use crate::flat::FlatCache;
use crate::grouped::GroupedCache;

/// All entity caches for one client
#[derive(Debug)]
pub struct Caches {
    users: FlatCache<User>,
    guilds: FlatCache<Guild>,
    channels: FlatCache<Channel>,
    members: GroupedCache<GuildMember>,
    roles: GroupedCache<Role>,
    messages: GroupedCache<Message>,
    voice_states: GroupedCache<VoiceState>,
    presences: GroupedCache<Presence>,
    bans: GroupedCache<Ban>,
}

impl Caches {
    /// Build every store from one immutable configuration
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let flags = config.flags;
        Self {
            users: FlatCache::new(flags, CacheFlags::USERS, config.user_policy.clone()),
            guilds: FlatCache::new(flags, CacheFlags::GUILDS, None),
            channels: FlatCache::new(flags, CacheFlags::CHANNELS, None),
            members: GroupedCache::new(flags, CacheFlags::MEMBERS, config.member_policy.clone()),
            roles: GroupedCache::new(flags, CacheFlags::ROLES, None),
            messages: GroupedCache::new(flags, CacheFlags::MESSAGES, config.message_policy.clone()),
            voice_states: GroupedCache::new(flags, CacheFlags::VOICE_STATES, None),
            presences: GroupedCache::new(flags, CacheFlags::PRESENCES, None),
            bans: GroupedCache::new(flags, CacheFlags::BANS, None),
        }
    }

    /// User cache (flat)
    pub fn users(&self) -> &FlatCache<User> {
        &self.users
    }

    /// Guild cache (flat)
    pub fn guilds(&self) -> &FlatCache<Guild> {
        &self.guilds
    }

    /// Channel cache (flat)
    pub fn channels(&self) -> &FlatCache<Channel> {
        &self.channels
    }

    /// Member cache, grouped by guild
    pub fn members(&self) -> &GroupedCache<GuildMember> {
        &self.members
    }

    /// Role cache, grouped by guild
    pub fn roles(&self) -> &GroupedCache<Role> {
        &self.roles
    }

    /// Message cache, grouped by channel
    pub fn messages(&self) -> &GroupedCache<Message> {
        &self.messages
    }

    /// Voice state cache, grouped by guild
    pub fn voice_states(&self) -> &GroupedCache<VoiceState> {
        &self.voice_states
    }

    /// Presence cache, grouped by guild
    pub fn presences(&self) -> &GroupedCache<Presence> {
        &self.presences
    }

    /// Ban cache, grouped by guild
    pub fn bans(&self) -> &GroupedCache<Ban> {
        &self.bans
    }

    /// Drop every entity scoped to a guild
    ///
    /// Used when the client leaves a guild or the guild becomes
    /// unavailable; channel-scoped message buckets for the guild's channels
    /// are swept via the channel cache.
    pub fn remove_guild(&self, guild_id: relay_core::Snowflake) {
        self.guilds.remove(guild_id);
        self.members.remove_all(guild_id);
        self.roles.remove_all(guild_id);
        self.voice_states.remove_all(guild_id);
        self.presences.remove_all(guild_id);
        self.bans.remove_all(guild_id);

        let channel_ids: Vec<_> = self
            .channels
            .find_all(|channel| channel.guild_id == Some(guild_id))
            .into_iter()
            .map(|channel| channel.id)
            .collect();
        for channel_id in channel_ids {
            self.messages.remove_all(channel_id);
            self.channels.remove(channel_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{ChannelType, Snowflake, UserFlags};

    fn test_user(id: i64) -> User {
        User {
            id: Snowflake::new(id),
            username: format!("user{id}"),
            discriminator: "0001".to_string(),
            avatar: None,
            bot: false,
            system: false,
            public_flags: UserFlags::empty(),
        }
    }

    fn full_caches() -> Caches {
        Caches::new(&CacheConfig::new().with_flags(CacheFlags::all()))
    }

    #[test]
    fn test_flag_gating_per_kind() {
        let caches = Caches::new(&CacheConfig::new().with_flags(CacheFlags::USERS));

        caches.users().put(Snowflake::new(1), test_user(1));
        assert!(caches.users().get(Snowflake::new(1)).is_some());

        let guild = Guild {
            id: Snowflake::new(5),
            name: "g".to_string(),
            icon: None,
            description: None,
            owner_id: Snowflake::new(1),
            member_count: None,
            unavailable: false,
        };
        caches.guilds().put(guild.id, guild);
        assert!(caches.guilds().get(Snowflake::new(5)).is_none());
    }

    #[test]
    fn test_remove_guild_sweeps_scoped_kinds() {
        let caches = full_caches();
        let guild_id = Snowflake::new(5);

        let guild = Guild {
            id: guild_id,
            name: "g".to_string(),
            icon: None,
            description: None,
            owner_id: Snowflake::new(1),
            member_count: None,
            unavailable: false,
        };
        caches.guilds().put(guild_id, guild);

        let channel = Channel {
            id: Snowflake::new(50),
            kind: ChannelType::Text,
            guild_id: Some(guild_id),
            name: Some("general".to_string()),
            topic: None,
            parent_id: None,
            position: None,
        };
        caches.channels().put(channel.id, channel);

        let role = Role {
            id: Snowflake::new(7),
            guild_id,
            name: "mod".to_string(),
            color: 0,
            position: 0,
            hoist: false,
            mentionable: false,
        };
        caches.roles().put(guild_id, role.id, role);

        caches.remove_guild(guild_id);

        assert!(caches.guilds().get(guild_id).is_none());
        assert!(caches.channels().get(Snowflake::new(50)).is_none());
        assert!(caches.roles().group_all(guild_id).is_empty());
        assert!(caches.messages().group_all(Snowflake::new(50)).is_empty());
    }
}
