//! JSON run document

use crate::{
    error::{ErrorContext, Result},
    executor::ExecutionResults,
    models::{LatencySummary, SessionOutcome, SessionTally, TestParameters},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a run measured, as one JSON object
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub run_id: &'a str,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_ms: f64,
    pub interrupted: bool,
    pub parameters: &'a TestParameters,
    pub total_msgs: usize,
    pub frames_sent: u64,
    /// `null` when no reply arrived
    pub latency: Option<&'a LatencySummary>,
    pub session_tally: &'a SessionTally,
    /// Only populated in verbose mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sessions: Vec<SessionOutcome>,
}

impl<'a> JsonReport<'a> {
    pub fn from_results(results: &'a ExecutionResults, include_sessions: bool) -> Self {
        let aggregate = &results.aggregate;
        Self {
            run_id: &results.summary.run_id,
            started_at: results.summary.started_at,
            completed_at: results.summary.completed_at,
            elapsed_ms: results.summary.total_duration.as_secs_f64() * 1000.0,
            interrupted: results.summary.interrupted,
            parameters: &aggregate.parameters,
            total_msgs: aggregate.total_msgs(),
            frames_sent: aggregate.frames_sent,
            latency: aggregate.summary.as_ref(),
            session_tally: &aggregate.sessions,
            sessions: if include_sessions {
                results.outcomes()
            } else {
                Vec::new()
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}
