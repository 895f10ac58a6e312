//! Client facade

mod builder;
mod client;
mod state;

pub use builder::ClientBuilder;
pub use client::Client;
pub use state::ClientState;
