//! Ban entity - a guild ban

use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Guild ban entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ban {
    pub user: User,
    #[serde(default)]
    pub guild_id: Snowflake,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_wire_decode() {
        let json = r#"{
            "user": {"id": "200", "username": "banned"},
            "guild_id": "1",
            "reason": "spam"
        }"#;
        let ban: Ban = serde_json::from_str(json).unwrap();
        assert_eq!(ban.user.id, Snowflake::new(200));
        assert_eq!(ban.reason.as_deref(), Some("spam"));
    }
}
