//! Session lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle state of a gateway session
///
/// `Reconnecting` loops back into `Connecting`; `Disconnected` is terminal
/// once the session was explicitly closed or hit a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No transport; initial and terminal state
    Disconnected,
    /// Opening the transport and waiting for Hello
    Connecting,
    /// Fresh handshake in flight
    Identifying,
    /// Resume handshake in flight
    Resuming,
    /// Handshake acknowledged; dispatches flowing
    Connected,
    /// Torn down, waiting for the backoff delay before reconnecting
    Reconnecting,
}

impl SessionState {
    /// Check if the session currently has a live, authenticated connection
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if a handshake is in flight
    #[must_use]
    pub fn is_handshaking(&self) -> bool {
        matches!(self, Self::Identifying | Self::Resuming)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Identifying => "Identifying",
            Self::Resuming => "Resuming",
            Self::Connected => "Connected",
            Self::Reconnecting => "Reconnecting",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(SessionState::Connected.is_connected());
        assert!(!SessionState::Resuming.is_connected());

        assert!(SessionState::Identifying.is_handshaking());
        assert!(SessionState::Resuming.is_handshaking());
        assert!(!SessionState::Connected.is_handshaking());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Reconnecting.to_string(), "Reconnecting");
    }
}
