//! Load-run execution
//!
//! [`ClientPool`] launches one [`ClientSession`](crate::session::ClientSession)
//! per client, holds the run open for the configured duration, stops every
//! session and pools what they measured.

pub mod pool;

pub use pool::ClientPool;

use crate::error::SessionError;
use crate::models::{AggregateResult, Config, SessionOutcome, SessionReport};
use crate::types::PacingStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-run settings every session reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// `host:port`, IPv6 hosts bracketed
    pub target: String,
    pub clients: usize,
    /// Frames per second per client
    pub rate: f64,
    pub msg_size: usize,
    pub duration: Duration,
    pub reply_timeout: Duration,
    pub connect_timeout: Duration,
    pub pacing: PacingStrategy,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            target: config.target(),
            clients: config.clients,
            rate: config.rate,
            msg_size: config.msg_size,
            duration: config.duration(),
            reply_timeout: config.reply_timeout(),
            connect_timeout: config.connect_timeout(),
            pacing: config.pacing,
            verbose: config.verbose,
            debug: config.debug,
        }
    }
}

/// Wall-clock facts about a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_duration: Duration,
    /// The run was cut short by an interrupt
    pub interrupted: bool,
}

/// Everything a run produced
#[derive(Debug)]
pub struct ExecutionResults {
    pub summary: ExecutionSummary,
    pub aggregate: AggregateResult,
    /// One report per client, in client-index order
    pub reports: Vec<SessionReport>,
}

impl ExecutionResults {
    /// Errors of the sessions that failed, in client-index order
    pub fn failures(&self) -> Vec<&SessionError> {
        self.reports
            .iter()
            .filter_map(|report| report.termination.error())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|report| report.termination.is_failure())
    }

    pub fn outcomes(&self) -> Vec<SessionOutcome> {
        self.reports.iter().map(SessionReport::outcome).collect()
    }
}
