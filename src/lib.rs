//! Chat Bench
//!
//! A load generator for line-delimited TCP chat and echo services. It opens
//! many concurrent client connections, sends randomized fixed-size frames at
//! a configured rate, waits for one reply line per frame and reports the
//! round-trip latency distribution across every client.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod frame;
pub mod logging;
pub mod models;
pub mod output;
pub mod session;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result, SessionError};
pub use executor::{ClientPool, ExecutionResults};
pub use frame::{Frame, MessageGenerator};
pub use models::{AggregateResult, Config, LatencySummary, SessionReport, TestParameters};
pub use output::{OutputCoordinator, OutputFormatter, OutputFormatterFactory};
pub use session::{ClientSession, StopHandle, StopSignal};
pub use stats::aggregate;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 2000;
    pub const DEFAULT_CLIENTS: usize = 10;
    pub const DEFAULT_RATE: f64 = 1.0;
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);
    pub const DEFAULT_MSG_SIZE: usize = 64;
    pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_DURATION_SECS: u64 = 86_400;
    pub const MAX_TIMEOUT_SECS: u64 = 300;
    pub const MAX_MSG_SIZE: usize = 1024 * 1024;
    pub const MAX_CLIENTS: usize = 100_000;
    /// One frame every ~17 minutes
    pub const MIN_RATE: f64 = 0.001;
    pub const MAX_RATE: f64 = 100_000.0;
}
