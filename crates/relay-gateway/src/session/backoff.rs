//! Reconnect backoff
//!
//! Exponential backoff with full jitter. Transient failures retry forever;
//! the delay just keeps the client from hammering a struggling gateway.

use rand::Rng;
use relay_common::BackoffConfig;
use std::time::Duration;

/// Exponential backoff state for one reconnect cycle
#[derive(Debug)]
pub(crate) struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub(crate) fn new(config: &BackoffConfig) -> Self {
        Self {
            base: Duration::from_millis(config.base_ms),
            max: Duration::from_millis(config.max_ms),
            attempt: 0,
        }
    }

    /// Next delay: random in [0, base * 2^attempt], capped at max
    pub(crate) fn next_delay(&mut self) -> Duration {
        let ceiling = self
            .base
            .saturating_mul(2u32.saturating_pow(self.attempt.min(16)))
            .min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let ms = rand::thread_rng().gen_range(0..=ceiling.as_millis() as u64);
        Duration::from_millis(ms)
    }

    /// Reset after a successful handshake
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }

    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }
}
