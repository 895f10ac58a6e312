//! Transport abstraction
//!
//! The session state machine drives a full-duplex, message-oriented
//! connection through these traits. Production uses the tungstenite
//! implementation; tests substitute a scripted connector.

mod tungstenite;

use async_trait::async_trait;

use crate::protocol::GatewayMessage;

pub use tungstenite::WebSocketConnector;

/// One received unit from the transport
#[derive(Debug, Clone)]
pub enum Frame {
    /// A decoded gateway message
    Message(GatewayMessage),
    /// The remote closed the connection, optionally with a close code
    Close(Option<u16>),
}

/// Transport failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Frame decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Transport closed")]
    Closed,
}

/// Write half of a connection
#[async_trait]
pub trait TransportSink: Send {
    /// Send one gateway message
    async fn send(&mut self, message: GatewayMessage) -> Result<(), TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a connection
#[async_trait]
pub trait TransportStream: Send {
    /// Receive the next frame; None once the stream is exhausted
    async fn next(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// Factory opening fresh connections for each (re)connect attempt
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to the gateway URL
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), TransportError>;
}
