//! Client error types
//!
//! Only terminal failures cross the API boundary; transient transport and
//! session errors are recovered internally and logged.

use std::fmt;

/// Terminal client error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The service rejected the credentials; not retried past the
    /// configured cap
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The client was closed before or during the operation
    #[error("Client closed")]
    Closed,

    /// Configuration problem detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failed in a way the reconnect policy cannot recover
    #[error("Transport error: {0}")]
    Transport(String),

    /// REST collaborator failure surfaced to a caller
    #[error("REST error: {0}")]
    Rest(String),

    /// Anything unexpected
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl ClientError {
    /// Check if the error is fatal for the whole client (vs. a single call)
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::Closed | Self::Config(_)
        )
    }

    /// Create a config error
    #[must_use]
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
