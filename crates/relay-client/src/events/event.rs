//! Domain events
//!
//! The typed, immutable facts derived from dispatch payloads. Variants are
//! a tagged union, each embedding the generic [`EventContext`] by value.
//! Accessors that need other entities resolve them lazily from the caches.

use relay_core::{
    Channel, Guild, GuildMember, Message, Presence, ReactionEmoji, Snowflake, User, VoiceState,
};

use super::{EventContext, EventType};

/// A typed domain event, fanned out to listeners after the cache mutation
#[derive(Debug, Clone)]
pub enum Event {
    Ready(ReadyEvent),
    Resumed(ResumedEvent),
    GuildCreate(GuildCreateEvent),
    GuildUpdate(GuildUpdateEvent),
    GuildDelete(GuildDeleteEvent),
    ChannelCreate(ChannelCreateEvent),
    ChannelUpdate(ChannelUpdateEvent),
    ChannelDelete(ChannelDeleteEvent),
    MemberJoin(MemberJoinEvent),
    MemberUpdate(MemberUpdateEvent),
    MemberLeave(MemberLeaveEvent),
    GuildBan(GuildBanEvent),
    GuildUnban(GuildUnbanEvent),
    MessageCreate(MessageCreateEvent),
    MessageUpdate(MessageUpdateEvent),
    MessageDelete(MessageDeleteEvent),
    ReactionAdd(MessageReactionAddEvent),
    ReactionRemove(MessageReactionRemoveEvent),
    PresenceUpdate(PresenceUpdateEvent),
    TypingStart(TypingStartEvent),
    UserUpdate(UserUpdateEvent),
    VoiceStateUpdate(VoiceStateUpdateEvent),
}

impl Event {
    /// The wire event type this event was derived from
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Ready(_) => EventType::Ready,
            Self::Resumed(_) => EventType::Resumed,
            Self::GuildCreate(_) => EventType::GuildCreate,
            Self::GuildUpdate(_) => EventType::GuildUpdate,
            Self::GuildDelete(_) => EventType::GuildDelete,
            Self::ChannelCreate(_) => EventType::ChannelCreate,
            Self::ChannelUpdate(_) => EventType::ChannelUpdate,
            Self::ChannelDelete(_) => EventType::ChannelDelete,
            Self::MemberJoin(_) => EventType::GuildMemberAdd,
            Self::MemberUpdate(_) => EventType::GuildMemberUpdate,
            Self::MemberLeave(_) => EventType::GuildMemberRemove,
            Self::GuildBan(_) => EventType::GuildBanAdd,
            Self::GuildUnban(_) => EventType::GuildBanRemove,
            Self::MessageCreate(_) => EventType::MessageCreate,
            Self::MessageUpdate(_) => EventType::MessageUpdate,
            Self::MessageDelete(_) => EventType::MessageDelete,
            Self::ReactionAdd(_) => EventType::MessageReactionAdd,
            Self::ReactionRemove(_) => EventType::MessageReactionRemove,
            Self::PresenceUpdate(_) => EventType::PresenceUpdate,
            Self::TypingStart(_) => EventType::TypingStart,
            Self::UserUpdate(_) => EventType::UserUpdate,
            Self::VoiceStateUpdate(_) => EventType::VoiceStateUpdate,
        }
    }

    /// The shared context of this event
    #[must_use]
    pub fn context(&self) -> &EventContext {
        match self {
            Self::Ready(e) => &e.ctx,
            Self::Resumed(e) => &e.ctx,
            Self::GuildCreate(e) => &e.ctx,
            Self::GuildUpdate(e) => &e.ctx,
            Self::GuildDelete(e) => &e.ctx,
            Self::ChannelCreate(e) => &e.ctx,
            Self::ChannelUpdate(e) => &e.ctx,
            Self::ChannelDelete(e) => &e.ctx,
            Self::MemberJoin(e) => &e.ctx,
            Self::MemberUpdate(e) => &e.ctx,
            Self::MemberLeave(e) => &e.ctx,
            Self::GuildBan(e) => &e.ctx,
            Self::GuildUnban(e) => &e.ctx,
            Self::MessageCreate(e) => &e.ctx,
            Self::MessageUpdate(e) => &e.ctx,
            Self::MessageDelete(e) => &e.ctx,
            Self::ReactionAdd(e) => &e.ctx,
            Self::ReactionRemove(e) => &e.ctx,
            Self::PresenceUpdate(e) => &e.ctx,
            Self::TypingStart(e) => &e.ctx,
            Self::UserUpdate(e) => &e.ctx,
            Self::VoiceStateUpdate(e) => &e.ctx,
        }
    }

    /// Sequence number of the originating dispatch
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.context().sequence()
    }
}

/// Fresh handshake acknowledged; the mirror is being repopulated
#[derive(Debug, Clone)]
pub struct ReadyEvent {
    pub ctx: EventContext,
    pub session_id: String,
    pub user: User,
    pub guild_ids: Vec<Snowflake>,
}

/// Resume acknowledged; missed dispatches were replayed
#[derive(Debug, Clone)]
pub struct ResumedEvent {
    pub ctx: EventContext,
}

#[derive(Debug, Clone)]
pub struct GuildCreateEvent {
    pub ctx: EventContext,
    pub guild: Guild,
}

#[derive(Debug, Clone)]
pub struct GuildUpdateEvent {
    pub ctx: EventContext,
    pub guild: Guild,
    /// Cached value before this update, if it was mirrored
    pub old: Option<Guild>,
}

#[derive(Debug, Clone)]
pub struct GuildDeleteEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    /// True when the guild only became unavailable rather than removed
    pub unavailable: bool,
}

#[derive(Debug, Clone)]
pub struct ChannelCreateEvent {
    pub ctx: EventContext,
    pub channel: Channel,
}

#[derive(Debug, Clone)]
pub struct ChannelUpdateEvent {
    pub ctx: EventContext,
    pub channel: Channel,
    pub old: Option<Channel>,
}

#[derive(Debug, Clone)]
pub struct ChannelDeleteEvent {
    pub ctx: EventContext,
    pub channel: Channel,
}

/// A user joined a guild
#[derive(Debug, Clone)]
pub struct MemberJoinEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    pub member: GuildMember,
}

#[derive(Debug, Clone)]
pub struct MemberUpdateEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    pub member: GuildMember,
    pub old: Option<GuildMember>,
}

#[derive(Debug, Clone)]
pub struct MemberLeaveEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    pub user: User,
    /// The cached membership, when the member cache had it
    pub member: Option<GuildMember>,
}

#[derive(Debug, Clone)]
pub struct GuildBanEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct GuildUnbanEvent {
    pub ctx: EventContext,
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct MessageCreateEvent {
    pub ctx: EventContext,
    pub message: Message,
}

#[derive(Debug, Clone)]
pub struct MessageUpdateEvent {
    pub ctx: EventContext,
    pub message: Message,
    pub old: Option<Message>,
}

#[derive(Debug, Clone)]
pub struct MessageDeleteEvent {
    pub ctx: EventContext,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// The deleted message, when the message cache had it
    pub message: Option<Message>,
}

/// A user added a reaction to a message
#[derive(Debug, Clone)]
pub struct MessageReactionAddEvent {
    pub ctx: EventContext,
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: ReactionEmoji,
}

impl MessageReactionAddEvent {
    /// The reacting user. This only checks cached users.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.ctx.caches().users().get(self.user_id)
    }

    /// The reacted message. This only checks cached messages.
    #[must_use]
    pub fn message(&self) -> Option<Message> {
        self.ctx.caches().messages().get(self.channel_id, self.message_id)
    }
}

/// A user removed a reaction from a message
#[derive(Debug, Clone)]
pub struct MessageReactionRemoveEvent {
    pub ctx: EventContext,
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: ReactionEmoji,
}

impl MessageReactionRemoveEvent {
    /// The reacting user. This only checks cached users.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.ctx.caches().users().get(self.user_id)
    }

    /// The reacted message. This only checks cached messages.
    #[must_use]
    pub fn message(&self) -> Option<Message> {
        self.ctx.caches().messages().get(self.channel_id, self.message_id)
    }
}

#[derive(Debug, Clone)]
pub struct PresenceUpdateEvent {
    pub ctx: EventContext,
    pub presence: Presence,
}

#[derive(Debug, Clone)]
pub struct TypingStartEvent {
    pub ctx: EventContext,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

impl TypingStartEvent {
    /// The typing user. This only checks cached users.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.ctx.caches().users().get(self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct UserUpdateEvent {
    pub ctx: EventContext,
    pub user: User,
    pub old: Option<User>,
}

#[derive(Debug, Clone)]
pub struct VoiceStateUpdateEvent {
    pub ctx: EventContext,
    pub state: VoiceState,
    pub old: Option<VoiceState>,
}
