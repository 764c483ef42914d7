//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Lifecycle of a single client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Opening the TCP connection
    Connecting,
    /// Sending frames and awaiting replies
    Active,
    /// Stop observed, tearing down
    Cancelling,
    /// Connection released
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Cancelling => "cancelling",
            Self::Closed => "closed",
        }
    }
}

/// How a session picks the instant of its next send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PacingStrategy {
    /// Next send is the previous scheduled send plus one interval.
    /// Slow replies eat into the following sleep instead of shifting the schedule.
    #[default]
    Schedule,
    /// Sleep a full interval after every reply
    FixedDelay,
}

impl PacingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::FixedDelay => "fixed-delay",
        }
    }
}

impl fmt::Display for PacingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacingStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "schedule" | "scheduled" => Ok(Self::Schedule),
            "fixed-delay" | "fixed_delay" | "delay" => Ok(Self::FixedDelay),
            _ => Err(AppError::parse(format!("Invalid pacing strategy: {}", s))),
        }
    }
}

/// Report rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_strategy_parsing() {
        assert_eq!("schedule".parse::<PacingStrategy>().unwrap(), PacingStrategy::Schedule);
        assert_eq!("FIXED-DELAY".parse::<PacingStrategy>().unwrap(), PacingStrategy::FixedDelay);
        assert_eq!("fixed_delay".parse::<PacingStrategy>().unwrap(), PacingStrategy::FixedDelay);
        assert!("burst".parse::<PacingStrategy>().is_err());
    }

    #[test]
    fn test_pacing_strategy_default_and_display() {
        assert_eq!(PacingStrategy::default(), PacingStrategy::Schedule);
        assert_eq!(PacingStrategy::FixedDelay.to_string(), "fixed-delay");
    }

    #[test]
    fn test_session_state_names() {
        assert_eq!(SessionState::Connecting.as_str(), "connecting");
        assert_eq!(SessionState::Closed.as_str(), "closed");
    }

    #[test]
    fn test_output_format_serialization() {
        let json = serde_json::to_string(&OutputFormat::Csv).unwrap();
        assert_eq!(json, "\"csv\"");
        assert_eq!(OutputFormat::default(), OutputFormat::Human);
    }
}
