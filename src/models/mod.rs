//! Data models for the load generator

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{
    AggregateResult, LatencySummary, SessionOutcome, SessionReport, SessionTally, Termination,
    TestParameters,
};
