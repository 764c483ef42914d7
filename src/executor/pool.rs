//! Run orchestration: spawn every client, stop them at the deadline, pool
//! their samples.

use super::{ExecutionConfig, ExecutionResults, ExecutionSummary};
use crate::error::{AppError, Result, SessionError};
use crate::logging::Logger;
use crate::models::{AggregateResult, Config, SessionReport, SessionTally, TestParameters};
use crate::session::{stop_channel, ClientSession};
use crate::stats::LatencyAggregator;
use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

/// Owns the sessions of one run
pub struct ClientPool {
    config: Arc<ExecutionConfig>,
    parameters: TestParameters,
    logger: Arc<Logger>,
    run_id: String,
}

impl ClientPool {
    pub fn new(config: &Config, logger: Arc<Logger>) -> Self {
        Self {
            config: Arc::new(ExecutionConfig::from(config)),
            parameters: config.test_parameters(),
            logger,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Tag results with an externally chosen run id
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run for the configured duration
    pub async fn run_test(&self) -> Result<ExecutionResults> {
        self.run_test_until(std::future::pending::<()>()).await
    }

    /// Run for the configured duration, or until `interrupt` resolves,
    /// whichever comes first. Sessions stopped early still contribute the
    /// samples they already took.
    pub async fn run_test_until<F>(&self, interrupt: F) -> Result<ExecutionResults>
    where
        F: Future<Output = ()>,
    {
        let clients = self.config.clients;
        if clients == 0 {
            return Err(AppError::test_execution("Cannot run a load test with zero clients"));
        }

        self.logger
            .info(&format!(
                "Starting {} clients against {} for {}s at {} msg/s each",
                clients,
                self.config.target,
                self.config.duration.as_secs(),
                self.config.rate
            ))
            .field("clients", clients)
            .field("target", &self.config.target)
            .field("pacing", self.config.pacing.as_str())
            .log()
            .await;

        let (stop, signal) = stop_channel();
        let started_at = Utc::now();
        let start = Instant::now();
        // one deadline for every session, counted from the start of the run
        let deadline = start + self.config.duration;

        let tasks: Vec<JoinHandle<SessionReport>> = (0..clients)
            .map(|index| {
                let session = ClientSession::new(index, self.config.clone(), self.logger.clone());
                tokio::spawn(session.run(signal.clone(), deadline))
            })
            .collect();
        drop(signal);

        let joined = join_all(tasks);
        tokio::pin!(joined);
        tokio::pin!(interrupt);

        let mut interrupted = false;
        let outcomes = tokio::select! {
            // every session ended on its own before the deadline
            outcomes = &mut joined => outcomes,
            _ = sleep_until(deadline) => {
                self.logger.debug("Run duration elapsed, stopping remaining clients").log().await;
                stop.stop();
                joined.await
            }
            _ = &mut interrupt => {
                interrupted = true;
                self.logger.warn("Interrupted, stopping all clients").log().await;
                stop.stop();
                joined.await
            }
        };

        let reports: Vec<SessionReport> = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| match outcome {
                Ok(report) => report,
                Err(join_error) => SessionReport::failed(
                    index,
                    SessionError::Aborted {
                        client: index,
                        reason: join_error.to_string(),
                    },
                    Duration::ZERO,
                ),
            })
            .collect();

        let elapsed = start.elapsed();
        let aggregate = self.aggregate(&reports, elapsed);

        self.logger
            .info(&format!(
                "Run finished in {:.2}s: {} replies from {} sessions",
                elapsed.as_secs_f64(),
                aggregate.total_msgs(),
                reports.len()
            ))
            .field("completed", aggregate.sessions.completed)
            .field("stopped", aggregate.sessions.stopped)
            .field("failed", aggregate.sessions.failed)
            .log()
            .await;

        Ok(ExecutionResults {
            summary: ExecutionSummary {
                run_id: self.run_id.clone(),
                started_at,
                completed_at: Utc::now(),
                total_duration: elapsed,
                interrupted,
            },
            aggregate,
            reports,
        })
    }

    /// Pool reports in client-index order
    fn aggregate(&self, reports: &[SessionReport], elapsed: Duration) -> AggregateResult {
        let mut aggregator = LatencyAggregator::new();
        aggregator.add_reports(reports);

        AggregateResult {
            parameters: self.parameters.clone(),
            summary: aggregator.summarize(),
            frames_sent: reports.iter().map(|r| r.frames_sent).sum(),
            sessions: SessionTally::from_reports(reports),
            elapsed,
        }
    }
}
