//! REST collaborator
//!
//! Handlers and listeners that need data the gateway did not push issue
//! async requests through this interface; the core only depends on
//! "submit request, receive response or error".

mod rest_client;

pub use rest_client::{HttpRestClient, NoopRestClient, RestClient, RestError};

pub use reqwest::Method;
