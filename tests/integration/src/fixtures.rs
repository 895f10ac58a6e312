//! Payload fixtures
//!
//! Canned gateway payload bodies shared across the end-to-end tests.

use serde_json::{json, Value};

/// READY payload with the given session id
pub fn ready_payload(session_id: &str) -> Value {
    json!({
        "session_id": session_id,
        "user": {"id": "1", "username": "relay-bot"},
        "guilds": []
    })
}

/// GUILD_MEMBER_ADD payload for (guild, user)
pub fn member_add_payload(guild_id: i64, user_id: i64, username: &str) -> Value {
    json!({
        "guild_id": guild_id.to_string(),
        "user": {"id": user_id.to_string(), "username": username},
        "joined_at": "2024-06-01T12:00:00Z",
        "roles": []
    })
}

/// GUILD_BAN_REMOVE payload for (guild, user)
pub fn ban_remove_payload(guild_id: i64, user_id: i64) -> Value {
    json!({
        "guild_id": guild_id.to_string(),
        "user": {"id": user_id.to_string(), "username": "pardoned"}
    })
}

/// MESSAGE_CREATE payload for (channel, message)
pub fn message_payload(channel_id: i64, message_id: i64, content: &str) -> Value {
    json!({
        "id": message_id.to_string(),
        "channel_id": channel_id.to_string(),
        "author": {"id": "1", "username": "relay-bot"},
        "content": content,
        "timestamp": "2024-06-01T12:00:00Z"
    })
}
