//! # relay-gateway
//!
//! The client side of the gateway: wire protocol, transport abstraction,
//! heartbeat manager, and the session state machine that keeps a resumable
//! connection alive and feeds decoded dispatch payloads downstream.

pub mod protocol;
pub mod session;
pub mod transport;

mod error;

pub use error::GatewayError;
pub use protocol::{
    CloseCode, EventEnvelope, GatewayMessage, HelloPayload, IdentifyPayload, IdentifyProperties,
    Intents, OpCode, ResumePayload,
};
pub use session::{Session, SessionHandle, SessionState};
pub use transport::{
    Connector, Frame, TransportError, TransportSink, TransportStream, WebSocketConnector,
};
