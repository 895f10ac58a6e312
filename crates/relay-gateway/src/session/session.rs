//! Gateway session state machine
//!
//! Owns the transport for one logical session: connect, handshake
//! (identify or resume), sequence bookkeeping, opcode routing, and the
//! reconnect loop. Decoded dispatches flow downstream through a single
//! bounded channel; if the pipeline falls behind, the read loop blocks
//! rather than dropping payloads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use relay_common::GatewayConfig;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::error::GatewayError;
use crate::protocol::{
    CloseCode, EventEnvelope, GatewayMessage, HelloPayload, IdentifyPayload, OpCode, ResumePayload,
};
use crate::transport::{Connector, Frame, TransportError, TransportSink, TransportStream};

use super::{Backoff, HeartbeatManager, SessionState};

/// Capacity of the outbound writer channel
const OUTBOUND_BUFFER: usize = 16;

/// Wire tag of the dispatch confirming a fresh handshake
const READY: &str = "READY";

/// Wire tag of the dispatch confirming a resume
const RESUMED: &str = "RESUMED";

/// A gateway session, ready to be spawned
pub struct Session {
    config: GatewayConfig,
    identify: IdentifyPayload,
    connector: Arc<dyn Connector>,
}

impl Session {
    /// Create a session over the given connector
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        identify: IdentifyPayload,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            identify,
            connector,
        }
    }

    /// Spawn the session task
    ///
    /// Returns the control handle and the ordered stream of decoded
    /// dispatch payloads. Dropping the receiver shuts the session down.
    #[must_use]
    pub fn spawn(self) -> (SessionHandle, mpsc::Receiver<EventEnvelope>) {
        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer);
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(4);
        let sequence = Arc::new(AtomicU64::new(0));

        let runner = SessionRunner {
            config: self.config,
            identify: self.identify,
            connector: self.connector,
            state_tx,
            events_tx,
            sequence: sequence.clone(),
            acked: Arc::new(AtomicBool::new(true)),
            session_id: None,
            can_resume: false,
            resync: false,
            auth_failures: 0,
        };

        let task = tokio::spawn(runner.run(command_rx));

        (
            SessionHandle {
                state_rx,
                command_tx,
                sequence,
                task,
            },
            events_rx,
        )
    }
}

/// Control handle for a running session
pub struct SessionHandle {
    state_rx: watch::Receiver<SessionState>,
    command_tx: mpsc::Sender<SessionCommand>,
    sequence: Arc<AtomicU64>,
    task: JoinHandle<Result<(), GatewayError>>,
}

impl SessionHandle {
    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Watch receiver for state transitions
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Last sequence number recorded from a dispatch
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Request a graceful close
    ///
    /// Returns immediately; `join` observes the session actually ending.
    pub fn close(&self) {
        let _ = self.command_tx.try_send(SessionCommand::Close);
    }

    /// Wait for the session to end
    ///
    /// Ok on a requested close; Err carries the terminal failure (fatal
    /// close code or exhausted authentication attempts).
    pub async fn join(self) -> Result<(), GatewayError> {
        self.task.await.map_err(|_| GatewayError::Closed)?
    }
}

#[derive(Debug)]
enum SessionCommand {
    Close,
}

/// Why the connected phase ended
enum Teardown {
    /// Transient failure or remote request; re-enter the connect loop
    Reconnect,
    /// Close requested locally or the event receiver dropped
    Closed,
}

struct SessionRunner {
    config: GatewayConfig,
    identify: IdentifyPayload,
    connector: Arc<dyn Connector>,
    state_tx: watch::Sender<SessionState>,
    events_tx: mpsc::Sender<EventEnvelope>,
    /// Last received sequence; shared with the heartbeat manager
    sequence: Arc<AtomicU64>,
    /// Ack flag; set by the read loop, cleared by the heartbeat manager
    acked: Arc<AtomicBool>,
    /// Session identifier captured from READY
    session_id: Option<String>,
    /// Whether the last teardown permitted a resume
    can_resume: bool,
    /// A sequence gap was detected; force a fresh identify next connect
    resync: bool,
    auth_failures: u32,
}

impl SessionRunner {
    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<SessionCommand>,
    ) -> Result<(), GatewayError> {
        let mut backoff = Backoff::new(&self.config.backoff);

        loop {
            self.set_state(SessionState::Connecting);

            let connected = timeout(self.config.connect_timeout(), self.connect_and_handshake())
                .await
                .map_err(|_| TransportError::Connect("connect timed out".to_string()))
                .and_then(|inner| inner);

            let (sink, stream, hello) = match connected {
                Ok(parts) => parts,
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "Connect attempt failed; retrying"
                    );
                    if self.wait_or_close(&mut command_rx, delay).await {
                        self.set_state(SessionState::Disconnected);
                        return Ok(());
                    }
                    continue;
                }
            };

            backoff.reset();

            match self.drive(&mut command_rx, sink, stream, hello).await {
                Ok(Teardown::Closed) => {
                    self.set_state(SessionState::Disconnected);
                    return Ok(());
                }
                Ok(Teardown::Reconnect) => {
                    self.set_state(SessionState::Reconnecting);
                    let delay = backoff.next_delay();
                    if self.wait_or_close(&mut command_rx, delay).await {
                        self.set_state(SessionState::Disconnected);
                        return Ok(());
                    }
                }
                Err(GatewayError::FatalClose(CloseCode::AuthenticationFailed)) => {
                    self.auth_failures += 1;
                    self.invalidate_session();
                    if self.auth_failures >= self.config.max_auth_failures {
                        self.set_state(SessionState::Disconnected);
                        return Err(GatewayError::AuthenticationFailed {
                            attempts: self.auth_failures,
                        });
                    }
                    tracing::warn!(
                        attempts = self.auth_failures,
                        cap = self.config.max_auth_failures,
                        "Authentication failed; retrying with a fresh identify"
                    );
                    self.set_state(SessionState::Reconnecting);
                    let delay = backoff.next_delay();
                    if self.wait_or_close(&mut command_rx, delay).await {
                        self.set_state(SessionState::Disconnected);
                        return Ok(());
                    }
                }
                Err(fatal) => {
                    self.set_state(SessionState::Disconnected);
                    return Err(fatal);
                }
            }
        }
    }

    /// Open the transport, wait for Hello, send identify or resume
    async fn connect_and_handshake(
        &mut self,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>, HelloPayload), TransportError>
    {
        let (mut sink, mut stream) = self.connector.connect(&self.config.url).await?;

        let hello = match stream.next().await {
            Some(Ok(Frame::Message(msg))) => msg
                .as_hello()
                .ok_or_else(|| TransportError::Connect(format!("expected Hello, got {msg}")))?,
            Some(Ok(Frame::Close(code))) => {
                return Err(TransportError::Connect(format!(
                    "closed during handshake (code {code:?})"
                )));
            }
            Some(Err(e)) => return Err(e),
            None => return Err(TransportError::Closed),
        };

        let resuming = self.can_resume && self.session_id.is_some() && !self.resync;

        if resuming {
            // presence checked in the resuming condition
            let session_id = self.session_id.clone().unwrap_or_default();
            let seq = self.sequence.load(Ordering::SeqCst);
            self.set_state(SessionState::Resuming);
            tracing::info!(session_id = %session_id, seq, "Resuming session");
            sink.send(GatewayMessage::resume(ResumePayload {
                token: self.identify.token.clone(),
                session_id,
                seq,
            }))
            .await?;
        } else {
            self.invalidate_session();
            self.set_state(SessionState::Identifying);
            tracing::info!("Identifying new session");
            sink.send(GatewayMessage::identify(self.identify.clone())).await?;
        }

        Ok((sink, stream, hello))
    }

    /// Connected phase: route frames until the connection ends
    async fn drive(
        &mut self,
        command_rx: &mut mpsc::Receiver<SessionCommand>,
        sink: Box<dyn TransportSink>,
        mut stream: Box<dyn TransportStream>,
        hello: HelloPayload,
    ) -> Result<Teardown, GatewayError> {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        // drains until every sender is gone, then closes the sink
        let _writer = spawn_writer(sink, outbound_rx);

        let (zombie_tx, mut zombie_rx) = mpsc::channel(1);
        let heartbeat = HeartbeatManager::new(
            std::time::Duration::from_millis(hello.heartbeat_interval),
            self.sequence.clone(),
            self.acked.clone(),
            outbound_tx.clone(),
            zombie_tx,
        )
        .spawn();

        let teardown = loop {
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(SessionCommand::Close) | None => {
                            tracing::info!("Session close requested");
                            self.can_resume = false;
                            break Ok(Teardown::Closed);
                        }
                    }
                }
                _ = zombie_rx.recv() => {
                    // force-close and reconnect with resume
                    self.can_resume = true;
                    break Ok(Teardown::Reconnect);
                }
                frame = stream.next() => {
                    match frame {
                        None => {
                            tracing::warn!("Transport stream ended");
                            self.can_resume = true;
                            break Ok(Teardown::Reconnect);
                        }
                        Some(Err(TransportError::Decode(e))) => {
                            // one bad frame is not fatal; skip it
                            tracing::warn!(error = %e, "Dropping undecodable frame");
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Transport error");
                            self.can_resume = true;
                            break Ok(Teardown::Reconnect);
                        }
                        Some(Ok(Frame::Close(code))) => {
                            break self.on_close(code);
                        }
                        Some(Ok(Frame::Message(msg))) => {
                            match self.on_message(msg, &outbound_tx).await {
                                FrameOutcome::Continue => {}
                                FrameOutcome::Teardown(result) => break result,
                            }
                        }
                    }
                }
            }
        };

        heartbeat.abort();
        drop(outbound_tx);

        teardown
    }

    /// Route one decoded gateway message
    async fn on_message(
        &mut self,
        msg: GatewayMessage,
        outbound: &mpsc::Sender<GatewayMessage>,
    ) -> FrameOutcome {
        match msg.op {
            OpCode::Dispatch => self.on_dispatch(msg).await,
            OpCode::HeartbeatAck => {
                self.acked.store(true, Ordering::SeqCst);
                tracing::trace!("Heartbeat acknowledged");
                FrameOutcome::Continue
            }
            OpCode::Heartbeat => {
                // server asked for an immediate pulse
                let sequence = self.sequence.load(Ordering::SeqCst);
                let last = (sequence != 0).then_some(sequence);
                let _ = outbound.send(GatewayMessage::heartbeat(last)).await;
                FrameOutcome::Continue
            }
            OpCode::Reconnect => {
                tracing::info!("Remote requested reconnect");
                self.can_resume = true;
                FrameOutcome::Teardown(Ok(Teardown::Reconnect))
            }
            OpCode::InvalidSession => {
                let resumable = msg.as_invalid_session().unwrap_or(false);
                tracing::warn!(resumable, "Session invalidated by remote");
                if resumable {
                    self.can_resume = true;
                } else {
                    self.invalidate_session();
                }
                FrameOutcome::Teardown(Ok(Teardown::Reconnect))
            }
            OpCode::Hello | OpCode::Identify | OpCode::PresenceUpdate | OpCode::Resume => {
                tracing::debug!(op = %msg.op, "Ignoring unexpected opcode");
                FrameOutcome::Continue
            }
        }
    }

    /// Record the sequence number and forward the dispatch downstream
    async fn on_dispatch(&mut self, msg: GatewayMessage) -> FrameOutcome {
        let Some(envelope) = msg.into_envelope() else {
            tracing::debug!("Dropping malformed dispatch frame");
            return FrameOutcome::Continue;
        };

        let current = self.sequence.load(Ordering::SeqCst);
        match sequence_decision(current, envelope.sequence) {
            SequenceDecision::Drop => {
                tracing::warn!(
                    current,
                    received = envelope.sequence,
                    event_type = %envelope.event_type,
                    "Dropping out-of-order dispatch"
                );
                return FrameOutcome::Continue;
            }
            SequenceDecision::AcceptWithGap => {
                tracing::warn!(
                    current,
                    received = envelope.sequence,
                    "Sequence gap detected; full resync scheduled for next reconnect"
                );
                self.resync = true;
            }
            SequenceDecision::Accept => {}
        }
        self.sequence.store(envelope.sequence, Ordering::SeqCst);

        match envelope.event_type.as_str() {
            READY => {
                self.session_id = envelope
                    .data
                    .get("session_id")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned);
                self.can_resume = self.session_id.is_some();
                self.auth_failures = 0;
                self.set_state(SessionState::Connected);
                tracing::info!(session_id = ?self.session_id, "Session ready");
            }
            RESUMED => {
                self.auth_failures = 0;
                self.set_state(SessionState::Connected);
                tracing::info!(seq = envelope.sequence, "Session resumed");
            }
            _ => {}
        }

        // blocks when the pipeline falls behind; payloads are never dropped
        if self.events_tx.send(envelope).await.is_err() {
            tracing::info!("Event receiver dropped; shutting session down");
            self.can_resume = false;
            return FrameOutcome::Teardown(Ok(Teardown::Closed));
        }
        FrameOutcome::Continue
    }

    /// Classify a remote close code
    fn on_close(&mut self, code: Option<u16>) -> Result<Teardown, GatewayError> {
        let close_code = code.and_then(CloseCode::from_u16);
        match close_code {
            Some(code) if code.is_fatal() => {
                tracing::error!(code = %code, "Fatal close");
                Err(GatewayError::FatalClose(code))
            }
            Some(code) => {
                self.can_resume = code.can_resume();
                if !self.can_resume {
                    self.invalidate_session();
                }
                tracing::warn!(code = %code, resume = self.can_resume, "Remote closed connection");
                Ok(Teardown::Reconnect)
            }
            None => {
                // unknown or absent codes are treated as transient
                tracing::warn!(code = ?code, "Remote closed connection without a known code");
                self.can_resume = true;
                Ok(Teardown::Reconnect)
            }
        }
    }

    /// Sleep through the backoff delay; returns true if close was requested
    async fn wait_or_close(
        &mut self,
        command_rx: &mut mpsc::Receiver<SessionCommand>,
        delay: std::time::Duration,
    ) -> bool {
        tokio::select! {
            _ = sleep(delay) => false,
            command = command_rx.recv() => {
                matches!(command, Some(SessionCommand::Close) | None)
            }
        }
    }

    /// Drop resume state; the next connect performs a fresh identify
    fn invalidate_session(&mut self) {
        self.session_id = None;
        self.can_resume = false;
        self.resync = false;
        self.sequence.store(0, Ordering::SeqCst);
    }

    fn set_state(&self, state: SessionState) {
        let previous = *self.state_tx.borrow();
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Session state transition");
            self.state_tx.send_replace(state);
        }
    }
}

enum FrameOutcome {
    Continue,
    Teardown(Result<Teardown, GatewayError>),
}

/// Writer task: drains the outbound channel into the sink, closing it when
/// the channel ends
fn spawn_writer(
    mut sink: Box<dyn TransportSink>,
    mut outbound_rx: mpsc::Receiver<GatewayMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = sink.send(message).await {
                tracing::warn!(error = %e, "Failed to send outbound message");
                break;
            }
        }
        let _ = sink.close().await;
    })
}

/// Dispatch sequence bookkeeping
///
/// `current == 0` means no dispatch recorded yet for this session; the
/// first sequence is accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceDecision {
    Accept,
    AcceptWithGap,
    Drop,
}

fn sequence_decision(current: u64, received: u64) -> SequenceDecision {
    if current == 0 {
        SequenceDecision::Accept
    } else if received <= current {
        SequenceDecision::Drop
    } else if received > current + 1 {
        SequenceDecision::AcceptWithGap
    } else {
        SequenceDecision::Accept
    }
}
