//! Heartbeat manager
//!
//! Runs on its own timer while the session is connected. Every interval it
//! checks that the previous pulse was acknowledged, then sends the next one
//! carrying the last received sequence number. A missed ack marks the
//! connection as a zombie and signals the session loop to force a resumable
//! reconnect.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::protocol::GatewayMessage;

/// Periodic liveness pulse for one connection
pub struct HeartbeatManager {
    interval: Duration,
    sequence: Arc<AtomicU64>,
    acked: Arc<AtomicBool>,
    outbound: mpsc::Sender<GatewayMessage>,
    zombie: mpsc::Sender<()>,
}

impl HeartbeatManager {
    /// Create a manager for a freshly connected session
    ///
    /// `acked` starts true so the first tick sends rather than trips the
    /// zombie check; the session loop flips it back on every HeartbeatAck.
    #[must_use]
    pub fn new(
        interval: Duration,
        sequence: Arc<AtomicU64>,
        acked: Arc<AtomicBool>,
        outbound: mpsc::Sender<GatewayMessage>,
        zombie: mpsc::Sender<()>,
    ) -> Self {
        acked.store(true, Ordering::SeqCst);
        Self {
            interval,
            sequence,
            acked,
            outbound,
            zombie,
        }
    }

    /// Spawn the heartbeat task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // previous pulse must be acked before the next one is due
            if !self.acked.swap(false, Ordering::SeqCst) {
                tracing::warn!(
                    interval_ms = self.interval.as_millis() as u64,
                    "Heartbeat not acknowledged in time; connection is a zombie"
                );
                let _ = self.zombie.send(()).await;
                return;
            }

            let sequence = self.sequence.load(Ordering::SeqCst);
            let last = (sequence != 0).then_some(sequence);

            if self.outbound.send(GatewayMessage::heartbeat(last)).await.is_err() {
                // writer gone; session is tearing down
                return;
            }

            tracing::trace!(sequence = ?last, "Heartbeat sent");
        }
    }
}
