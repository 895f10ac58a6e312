//! Gateway wire protocol
//!
//! The JSON envelope, operation codes, close codes, and handshake payloads
//! exchanged over the WebSocket connection.

mod close_codes;
mod intents;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use intents::Intents;
pub use messages::{EventEnvelope, GatewayMessage};
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ResumePayload};
