//! The client facade
//!
//! Owns the configuration, the caches, the REST collaborator, and the
//! registries the pipeline reads from. `connect` spawns the gateway session
//! and the dispatch pipeline; everything else is accessors.

use std::sync::Arc;

use parking_lot::Mutex;
use relay_cache::Caches;
use relay_common::{ClientError, ClientResult, GatewayConfig};
use relay_gateway::{
    CloseCode, Connector, GatewayError, IdentifyPayload, Session, SessionHandle, SessionState,
};
use tokio::sync::watch;

use crate::dispatch::{Dispatcher, FanoutMode};
use crate::events::{EventListener, EventType, ListenerId, ListenerRegistry};
use crate::handlers::HandlerRegistry;
use crate::rest::RestClient;

use super::{ClientBuilder, ClientState};

/// A gateway client with a mirrored entity cache
pub struct Client {
    state: Arc<ClientState>,
    listeners: Arc<ListenerRegistry>,
    handlers: Arc<HandlerRegistry>,
    gateway_config: GatewayConfig,
    identify: IdentifyPayload,
    connector: Arc<dyn Connector>,
    fanout: FanoutMode,
    session: Mutex<Option<SessionHandle>>,
}

impl Client {
    /// Start building a client with the given token
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    pub(super) fn from_parts(
        state: Arc<ClientState>,
        listeners: Arc<ListenerRegistry>,
        handlers: Arc<HandlerRegistry>,
        gateway_config: GatewayConfig,
        identify: IdentifyPayload,
        connector: Arc<dyn Connector>,
        fanout: FanoutMode,
    ) -> Self {
        Self {
            state,
            listeners,
            handlers,
            gateway_config,
            identify,
            connector,
            fanout,
            session: Mutex::new(None),
        }
    }

    /// The mirrored entity caches
    #[must_use]
    pub fn caches(&self) -> &Caches {
        self.state.caches()
    }

    /// The REST collaborator
    #[must_use]
    pub fn rest(&self) -> &Arc<dyn RestClient> {
        self.state.rest()
    }

    /// Register a catch-all event listener
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Register a listener for one event type
    pub fn add_listener_for(
        &self,
        event_type: EventType,
        listener: Arc<dyn EventListener>,
    ) -> ListenerId {
        self.listeners.add_for(event_type, listener)
    }

    /// Remove a previously registered listener
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Open the gateway session and start the dispatch pipeline
    ///
    /// At most one session per client instance.
    pub fn connect(&self) -> ClientResult<()> {
        let mut guard = self.session.lock();
        if guard.is_some() {
            return Err(ClientError::config("client is already connected"));
        }

        let session = Session::new(
            self.gateway_config.clone(),
            self.identify.clone(),
            self.connector.clone(),
        );
        let (handle, events_rx) = session.spawn();

        Dispatcher::new(
            self.state.clone(),
            self.handlers.clone(),
            self.listeners.clone(),
            self.fanout,
        )
        .spawn(events_rx);

        *guard = Some(handle);
        tracing::info!("Client connected; session and pipeline started");
        Ok(())
    }

    /// Current session state, `Disconnected` before `connect`
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session
            .lock()
            .as_ref()
            .map_or(SessionState::Disconnected, SessionHandle::state)
    }

    /// Watch receiver for session state transitions
    #[must_use]
    pub fn session_state_receiver(&self) -> Option<watch::Receiver<SessionState>> {
        self.session.lock().as_ref().map(SessionHandle::state_receiver)
    }

    /// Last sequence number received from the gateway
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.session
            .lock()
            .as_ref()
            .map_or(0, SessionHandle::last_sequence)
    }

    /// Request a graceful close of the session
    pub fn close(&self) {
        if let Some(handle) = self.session.lock().as_ref() {
            handle.close();
        }
    }

    /// Wait until the session ends
    ///
    /// Ok after a requested close; Err carries the terminal failure (only
    /// fatal errors terminate the client).
    pub async fn wait_until_closed(&self) -> ClientResult<()> {
        let handle = self.session.lock().take();
        match handle {
            Some(handle) => handle.join().await.or_else(|e| match e {
                GatewayError::Closed => Ok(()),
                other => Err(map_gateway_error(other)),
            }),
            None => Err(ClientError::Closed),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("handlers", &self.handlers)
            .field("listeners", &self.listeners)
            .finish()
    }
}

/// Map a terminal gateway failure onto the client error taxonomy
fn map_gateway_error(error: GatewayError) -> ClientError {
    match error {
        GatewayError::AuthenticationFailed { .. }
        | GatewayError::FatalClose(CloseCode::AuthenticationFailed) => {
            ClientError::AuthenticationFailed
        }
        GatewayError::FatalClose(code) => ClientError::Transport(code.to_string()),
        GatewayError::Closed => ClientError::Closed,
        GatewayError::Transport(e) => ClientError::Transport(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_mapping() {
        assert!(matches!(
            map_gateway_error(GatewayError::AuthenticationFailed { attempts: 3 }),
            ClientError::AuthenticationFailed
        ));
        assert!(matches!(
            map_gateway_error(GatewayError::FatalClose(CloseCode::AuthenticationFailed)),
            ClientError::AuthenticationFailed
        ));
        assert!(matches!(
            map_gateway_error(GatewayError::FatalClose(CloseCode::ShardingRequired)),
            ClientError::Transport(_)
        ));
        assert!(matches!(
            map_gateway_error(GatewayError::Closed),
            ClientError::Closed
        ));
    }
}
