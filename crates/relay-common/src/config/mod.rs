//! Configuration structs

mod gateway_config;

pub use gateway_config::{BackoffConfig, ConfigError, GatewayConfig};
