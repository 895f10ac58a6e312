//! Entities mirrored from the remote service
//!
//! Every type here decodes directly from gateway payloads. The cache is the
//! long-term owner of these values; handlers only hold them transiently.

mod ban;
mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod role;
mod user;
mod voice_state;

pub use ban::Ban;
pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::GuildMember;
pub use message::{Message, ReactionEmoji};
pub use presence::{OnlineStatus, Presence};
pub use role::Role;
pub use user::{User, UserFlags};
pub use voice_state::VoiceState;
