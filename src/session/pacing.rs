//! Send scheduling for one session

use crate::types::PacingStrategy;
use std::time::Duration;
use tokio::time::Instant;

/// Computes when a session should send next.
///
/// With [`PacingStrategy::Schedule`] the n-th send is due at
/// `start + n * interval`; a slow reply only shortens the following sleep, and
/// a session that falls behind sends back-to-back until it catches up.
/// [`PacingStrategy::FixedDelay`] waits a full interval after each reply.
#[derive(Debug, Clone)]
pub struct Pacer {
    strategy: PacingStrategy,
    interval: Duration,
    next: Instant,
}

impl Pacer {
    /// `rate` must be positive and finite; config validation guarantees it
    pub fn new(strategy: PacingStrategy, rate: f64, start: Instant) -> Self {
        Self {
            strategy,
            interval: Duration::from_secs_f64(1.0 / rate),
            next: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant the next frame is due
    pub fn next_send(&self) -> Instant {
        self.next
    }

    /// Record a finished round trip at `now`; returns the next due instant
    pub fn advance(&mut self, now: Instant) -> Instant {
        self.next = match self.strategy {
            PacingStrategy::Schedule => self.next + self.interval,
            PacingStrategy::FixedDelay => now + self.interval,
        };
        self.next
    }
}
