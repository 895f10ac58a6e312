//! Client builder
//!
//! Every knob is a named option; the resulting configuration is immutable
//! once the session starts.

use std::sync::Arc;

use relay_cache::CacheConfig;
use relay_common::{ClientError, ClientResult, GatewayConfig};
use relay_gateway::{
    Connector, IdentifyPayload, IdentifyProperties, Intents, WebSocketConnector,
};

use crate::dispatch::FanoutMode;
use crate::events::ListenerRegistry;
use crate::handlers::{GatewayHandler, HandlerRegistry};
use crate::rest::{HttpRestClient, RestClient};

use super::{Client, ClientState};

/// Builder for [`Client`]
pub struct ClientBuilder {
    token: String,
    intents: Intents,
    properties: Option<IdentifyProperties>,
    gateway_config: GatewayConfig,
    cache_config: CacheConfig,
    rest: Option<Arc<dyn RestClient>>,
    connector: Option<Arc<dyn Connector>>,
    handlers: HandlerRegistry,
    fanout: FanoutMode,
}

impl ClientBuilder {
    /// Start a builder with the given token and defaults for everything else
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Intents::DEFAULT,
            properties: None,
            gateway_config: GatewayConfig::default(),
            cache_config: CacheConfig::new(),
            rest: None,
            connector: None,
            handlers: HandlerRegistry::with_defaults(),
            fanout: FanoutMode::default(),
        }
    }

    /// Set the subscribed event groups
    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Set the client properties sent during identify
    #[must_use]
    pub fn with_properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Set the gateway connection configuration
    #[must_use]
    pub fn with_gateway_config(mut self, config: GatewayConfig) -> Self {
        self.gateway_config = config;
        self
    }

    /// Set the cache flags and policies
    #[must_use]
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Replace the REST collaborator
    #[must_use]
    pub fn with_rest_client(mut self, rest: Arc<dyn RestClient>) -> Self {
        self.rest = Some(rest);
        self
    }

    /// Replace the transport connector
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Register a gateway handler, replacing the default for its type
    #[must_use]
    pub fn with_handler(mut self, handler: Box<dyn GatewayHandler>) -> Self {
        self.handlers.register(handler);
        self
    }

    /// Set how events are fanned out to listeners
    #[must_use]
    pub fn with_fanout(mut self, fanout: FanoutMode) -> Self {
        self.fanout = fanout;
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns a configuration error when the token is empty.
    pub fn build(self) -> ClientResult<Client> {
        if self.token.trim().is_empty() {
            return Err(ClientError::config("token must not be empty"));
        }

        let rest: Arc<dyn RestClient> = self
            .rest
            .unwrap_or_else(|| Arc::new(HttpRestClient::new(self.token.clone())));
        let connector: Arc<dyn Connector> = self
            .connector
            .unwrap_or_else(|| Arc::new(WebSocketConnector::new()));

        let state = Arc::new(ClientState::new(&self.cache_config, rest));
        let identify = IdentifyPayload {
            token: self.token,
            intents: self.intents,
            properties: self.properties,
        };

        Ok(Client::from_parts(
            state,
            Arc::new(ListenerRegistry::new()),
            Arc::new(self.handlers),
            self.gateway_config,
            identify,
            connector,
            self.fanout,
        ))
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("intents", &self.intents)
            .field("cache_config", &self.cache_config)
            .field("fanout", &self.fanout)
            .finish()
    }
}
