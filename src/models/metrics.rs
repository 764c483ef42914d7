//! Latency samples, per-session reports and the aggregate view

use crate::error::SessionError;
use crate::types::{PacingStrategy, SessionState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary statistics over a non-empty latency sample set, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
}

/// Run parameters echoed into every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    pub host: String,
    pub port: u16,
    pub clients: usize,
    pub rate_per_client: f64,
    pub duration_s: u64,
    pub msg_size: usize,
    pub pacing: PacingStrategy,
}

/// Why a session stopped sending
#[derive(Debug)]
pub enum Termination {
    /// Ran until its own deadline
    Completed,
    /// Observed the shared stop signal
    Stopped,
    Failed(SessionError),
}

impl Termination {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed(err) => err.kind(),
        }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Final record of one client session
#[derive(Debug)]
pub struct SessionReport {
    pub index: usize,
    /// Round-trip times in send order
    pub latencies_ms: Vec<f64>,
    pub frames_sent: u64,
    pub final_state: SessionState,
    pub termination: Termination,
    /// Time between the first connect attempt and teardown
    pub active_for: Duration,
}

impl SessionReport {
    /// Report for a session that never produced anything
    pub fn failed(index: usize, error: SessionError, active_for: Duration) -> Self {
        Self {
            index,
            latencies_ms: Vec::new(),
            frames_sent: 0,
            final_state: SessionState::Closed,
            termination: Termination::Failed(error),
            active_for,
        }
    }

    pub fn samples(&self) -> usize {
        self.latencies_ms.len()
    }

    /// Frames written whose reply never arrived before the session ended
    pub fn unanswered(&self) -> u64 {
        self.frames_sent.saturating_sub(self.latencies_ms.len() as u64)
    }

    pub fn mean_ms(&self) -> Option<f64> {
        if self.latencies_ms.is_empty() {
            None
        } else {
            Some(self.latencies_ms.iter().sum::<f64>() / self.latencies_ms.len() as f64)
        }
    }

    /// Serializable view for JSON output
    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            index: self.index,
            samples: self.samples(),
            frames_sent: self.frames_sent,
            state: self.final_state,
            result: self.termination.label().to_string(),
            error: self.termination.error().map(|e| e.to_string()),
            mean_ms: self.mean_ms(),
            active_ms: self.active_for.as_secs_f64() * 1000.0,
        }
    }
}

/// Flattened per-session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub index: usize,
    pub samples: usize,
    pub frames_sent: u64,
    pub state: SessionState,
    pub result: String,
    pub error: Option<String>,
    pub mean_ms: Option<f64>,
    pub active_ms: f64,
}

/// Counts of how sessions ended
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTally {
    pub completed: usize,
    pub stopped: usize,
    pub failed: usize,
    pub connect_failures: usize,
}

impl SessionTally {
    pub fn from_reports(reports: &[SessionReport]) -> Self {
        let mut tally = Self::default();
        for report in reports {
            match &report.termination {
                Termination::Completed => tally.completed += 1,
                Termination::Stopped => tally.stopped += 1,
                Termination::Failed(err) => {
                    tally.failed += 1;
                    if err.is_connect() {
                        tally.connect_failures += 1;
                    }
                }
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.completed + self.stopped + self.failed
    }
}

/// Pooled result of a whole run. `summary` is `None` when no reply arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub parameters: TestParameters,
    pub summary: Option<LatencySummary>,
    /// Frames written across all sessions, acknowledged or not
    pub frames_sent: u64,
    pub sessions: SessionTally,
    /// Wall-clock time from first spawn to last join
    pub elapsed: Duration,
}

impl AggregateResult {
    /// Acknowledged messages, the `total_msgs` column of the CSV record
    pub fn total_msgs(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.count)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
    }

    /// Acknowledged messages per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_msgs() as f64 / secs
        } else {
            0.0
        }
    }
}
