//! # relay-client
//!
//! The client facade: turns the gateway's dispatch stream into cache
//! mutations and typed domain events, fans events out to listeners, and
//! carries the REST collaborator for follow-up lookups.

pub mod client;
pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod rest;

pub use client::{Client, ClientBuilder, ClientState};
pub use dispatch::{Dispatcher, FanoutMode};
pub use events::{
    Event, EventContext, EventListener, EventType, FnListener, ListenerId, ListenerRegistry,
};
pub use handlers::{GatewayHandler, HandlerError, HandlerRegistry};
pub use rest::{HttpRestClient, RestClient, RestError};
