//! Test helpers
//!
//! A scripted connector implementing the gateway transport traits. Every
//! (re)connect attempt hands the test a fresh [`ScriptedConnection`] to
//! feed frames through and observe what the client sent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use relay_cache::{CacheConfig, CacheFlags};
use relay_client::rest::NoopRestClient;
use relay_client::Client;
use relay_common::{BackoffConfig, GatewayConfig};
use relay_gateway::{
    Connector, Frame, GatewayMessage, IdentifyPayload, OpCode, ResumePayload, SessionState,
    TransportError, TransportSink, TransportStream,
};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

/// Default timeout for any single expectation
pub const WAIT: Duration = Duration::from_secs(5);

/// Gateway config tuned for fast test reconnects
pub fn fast_gateway_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_connect_timeout(Duration::from_secs(2))
        .with_backoff(BackoffConfig {
            base_ms: 10,
            max_ms: 50,
        })
}

/// Build a client over a scripted connector
pub fn test_client(
    flags: CacheFlags,
) -> Result<(Client, mpsc::UnboundedReceiver<ScriptedConnection>)> {
    test_client_with(flags, fast_gateway_config())
}

/// Build a client over a scripted connector with custom gateway config
pub fn test_client_with(
    flags: CacheFlags,
    gateway_config: GatewayConfig,
) -> Result<(Client, mpsc::UnboundedReceiver<ScriptedConnection>)> {
    let (connector, connections) = MockConnector::new();
    let client = Client::builder("test-token")
        .with_connector(Arc::new(connector))
        .with_rest_client(Arc::new(NoopRestClient))
        .with_gateway_config(gateway_config)
        .with_cache_config(CacheConfig::new().with_flags(flags))
        .build()?;
    Ok((client, connections))
}

/// Connector that scripts one connection per connect attempt
pub struct MockConnector {
    connections_tx: mpsc::UnboundedSender<ScriptedConnection>,
}

impl MockConnector {
    /// Create the connector and the receiver yielding one
    /// [`ScriptedConnection`] per connect attempt
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScriptedConnection>) {
        let (connections_tx, connections_rx) = mpsc::unbounded_channel();
        (Self { connections_tx }, connections_rx)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        _url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), TransportError> {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();

        self.connections_tx
            .send(ScriptedConnection {
                frames: frames_tx,
                sent: sent_rx,
            })
            .map_err(|_| TransportError::Connect("test harness dropped".to_string()))?;

        Ok((
            Box::new(MockSink { sent: sent_tx }),
            Box::new(MockStream { frames: frames_rx }),
        ))
    }
}

struct MockSink {
    sent: mpsc::UnboundedSender<GatewayMessage>,
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, message: GatewayMessage) -> Result<(), TransportError> {
        self.sent.send(message).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

struct MockStream {
    frames: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
}

#[async_trait]
impl TransportStream for MockStream {
    async fn next(&mut self) -> Option<Result<Frame, TransportError>> {
        self.frames.recv().await
    }
}

/// The test's side of one scripted connection
pub struct ScriptedConnection {
    frames: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    sent: mpsc::UnboundedReceiver<GatewayMessage>,
}

impl ScriptedConnection {
    /// Feed one gateway message to the client
    pub fn send(&self, message: GatewayMessage) {
        let _ = self.frames.send(Ok(Frame::Message(message)));
    }

    /// Send the Hello frame opening the handshake
    pub fn hello(&self, heartbeat_interval_ms: u64) {
        self.send(GatewayMessage {
            op: OpCode::Hello,
            t: None,
            s: None,
            d: Some(serde_json::json!({ "heartbeat_interval": heartbeat_interval_ms })),
        });
    }

    /// Send a dispatch frame
    pub fn dispatch(&self, event_type: &str, sequence: u64, data: serde_json::Value) {
        self.send(GatewayMessage {
            op: OpCode::Dispatch,
            t: Some(event_type.to_string()),
            s: Some(sequence),
            d: Some(data),
        });
    }

    /// Send a heartbeat ack
    pub fn ack(&self) {
        self.send(GatewayMessage {
            op: OpCode::HeartbeatAck,
            t: None,
            s: None,
            d: None,
        });
    }

    /// Send an Invalid Session frame
    pub fn invalid_session(&self, resumable: bool) {
        self.send(GatewayMessage {
            op: OpCode::InvalidSession,
            t: None,
            s: None,
            d: Some(serde_json::Value::Bool(resumable)),
        });
    }

    /// Send a Reconnect request
    pub fn reconnect(&self) {
        self.send(GatewayMessage {
            op: OpCode::Reconnect,
            t: None,
            s: None,
            d: None,
        });
    }

    /// Close the connection with a close code
    pub fn close(&self, code: Option<u16>) {
        let _ = self.frames.send(Ok(Frame::Close(code)));
    }

    /// Drop the connection without a close frame (network failure)
    pub fn sever(self) {
        drop(self.frames);
    }

    /// Next message the client sent
    pub async fn next_sent(&mut self) -> Result<GatewayMessage> {
        timeout(WAIT, self.sent.recv())
            .await
            .map_err(|_| anyhow!("timed out waiting for a client message"))?
            .ok_or_else(|| anyhow!("client sink closed"))
    }

    /// Wait until the client sends an Identify, returning its payload
    pub async fn expect_identify(&mut self) -> Result<IdentifyPayload> {
        loop {
            let msg = self.next_sent().await?;
            match msg.op {
                OpCode::Identify => {
                    let data = msg.d.ok_or_else(|| anyhow!("identify without body"))?;
                    return Ok(serde_json::from_value(data)?);
                }
                OpCode::Heartbeat => continue,
                other => return Err(anyhow!("expected Identify, got {other}")),
            }
        }
    }

    /// Wait until the client sends a Resume, returning its payload
    pub async fn expect_resume(&mut self) -> Result<ResumePayload> {
        loop {
            let msg = self.next_sent().await?;
            match msg.op {
                OpCode::Resume => {
                    let data = msg.d.ok_or_else(|| anyhow!("resume without body"))?;
                    return Ok(serde_json::from_value(data)?);
                }
                OpCode::Heartbeat => continue,
                other => return Err(anyhow!("expected Resume, got {other}")),
            }
        }
    }

    /// Wait until the client sends a heartbeat, returning its sequence
    pub async fn expect_heartbeat(&mut self) -> Result<Option<u64>> {
        loop {
            let msg = self.next_sent().await?;
            if msg.op == OpCode::Heartbeat {
                return Ok(msg.d.as_ref().and_then(serde_json::Value::as_u64));
            }
        }
    }
}

/// Wait for the next scripted connection attempt
pub async fn next_connection(
    connections: &mut mpsc::UnboundedReceiver<ScriptedConnection>,
) -> Result<ScriptedConnection> {
    timeout(WAIT, connections.recv())
        .await
        .map_err(|_| anyhow!("timed out waiting for a connect attempt"))?
        .ok_or_else(|| anyhow!("connector dropped"))
}

/// Wait until the session reaches the given state
pub async fn wait_for_state(
    receiver: &mut watch::Receiver<SessionState>,
    wanted: SessionState,
) -> Result<()> {
    timeout(WAIT, async {
        loop {
            if *receiver.borrow() == wanted {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for state {wanted}"))?;

    if *receiver.borrow() == wanted {
        Ok(())
    } else {
        Err(anyhow!("state watch closed before reaching {wanted}"))
    }
}

/// Wait until a condition holds, polling between checks
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> Result<()> {
    timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for condition"))
}
