//! Gateway error types

use crate::protocol::CloseCode;
use crate::transport::TransportError;

/// Terminal gateway failure
///
/// Everything recoverable (network drops, resumable closes, zombie
/// connections) is handled inside the session loop; only these reach the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The service rejected the credentials past the retry cap
    #[error("Authentication failed after {attempts} attempts")]
    AuthenticationFailed { attempts: u32 },

    /// The remote closed with a fatal code that is not retried
    #[error("Fatal close: {0}")]
    FatalClose(CloseCode),

    /// The session was asked to close and did
    #[error("Session closed")]
    Closed,

    /// Transport failure outside the reconnect policy
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Check if this error means the credentials are unusable
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::FatalClose(CloseCode::AuthenticationFailed)
        )
    }
}
