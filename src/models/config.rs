//! Configuration data model and validation

use crate::defaults;
use crate::models::metrics::TestParameters;
use crate::types::{AppError, OutputFormat, PacingStrategy, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host of the service under test
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port of the service under test
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of concurrent client sessions
    #[serde(default = "default_clients")]
    pub clients: usize,

    /// Frames per second sent by each client
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Wall-clock length of the test
    #[serde(default = "default_duration_secs")]
    pub duration_seconds: u64,

    /// Payload length in bytes, delimiter excluded
    #[serde(default = "default_msg_size")]
    pub msg_size: usize,

    /// Bound on waiting for one reply line
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_seconds: u64,

    /// Bound on establishing a connection
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_seconds: u64,

    #[serde(default)]
    pub pacing: PacingStrategy,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Emit a header row before the CSV record
    #[serde(default)]
    pub csv_header: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            clients: default_clients(),
            rate: default_rate(),
            duration_seconds: default_duration_secs(),
            msg_size: default_msg_size(),
            reply_timeout_seconds: default_reply_timeout_secs(),
            connect_timeout_seconds: default_connect_timeout_secs(),
            pacing: PacingStrategy::default(),
            output_format: OutputFormat::default(),
            csv_header: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// `host:port` as handed to the connector
    pub fn target(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Nominal gap between two sends of one client
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate)
    }

    /// Parameters echoed back in every report
    pub fn test_parameters(&self) -> TestParameters {
        TestParameters {
            host: self.host.clone(),
            port: self.port,
            clients: self.clients,
            rate_per_client: self.rate,
            duration_s: self.duration_seconds,
            msg_size: self.msg_size,
            pacing: self.pacing,
        }
    }

    /// Validate the configuration and return the first hard error
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::config("Host cannot be empty"));
        }

        if self.port == 0 {
            return Err(AppError::config("Port must be greater than 0"));
        }

        if self.clients == 0 {
            return Err(AppError::config("Client count must be at least 1"));
        }

        if self.clients > defaults::MAX_CLIENTS {
            return Err(AppError::config(format!(
                "Client count cannot exceed {}",
                defaults::MAX_CLIENTS
            )));
        }

        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(AppError::config(format!(
                "Rate must be a positive number of messages per second, got {}",
                self.rate
            )));
        }

        if self.rate < defaults::MIN_RATE || self.rate > defaults::MAX_RATE {
            return Err(AppError::config(format!(
                "Rate must be between {} and {} messages per second, got {}",
                defaults::MIN_RATE,
                defaults::MAX_RATE,
                self.rate
            )));
        }

        if self.duration_seconds == 0 {
            return Err(AppError::config("Duration must be greater than 0"));
        }

        if self.duration_seconds > defaults::MAX_DURATION_SECS {
            return Err(AppError::config(format!(
                "Duration cannot exceed {} seconds",
                defaults::MAX_DURATION_SECS
            )));
        }

        if self.msg_size > defaults::MAX_MSG_SIZE {
            return Err(AppError::config(format!(
                "Message size cannot exceed {} bytes",
                defaults::MAX_MSG_SIZE
            )));
        }

        for (name, secs) in [
            ("Reply timeout", self.reply_timeout_seconds),
            ("Connect timeout", self.connect_timeout_seconds),
        ] {
            if secs == 0 {
                return Err(AppError::config(format!("{} must be greater than 0", name)));
            }
            if secs > defaults::MAX_TIMEOUT_SECS {
                return Err(AppError::config(format!(
                    "{} cannot exceed {} seconds",
                    name,
                    defaults::MAX_TIMEOUT_SECS
                )));
            }
        }

        Ok(())
    }

    /// Merge values from an arbitrary key lookup (the process environment in production)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CHAT_BENCH_HOST") {
            let host = host.trim();
            if !host.is_empty() {
                self.host = host.to_string();
            }
        }

        if let Some(port) = lookup("CHAT_BENCH_PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_PORT value '{}': {}", port, e)))?;
        }

        if let Some(clients) = lookup("CHAT_BENCH_CLIENTS") {
            self.clients = clients.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_CLIENTS value '{}': {}", clients, e)))?;
        }

        if let Some(rate) = lookup("CHAT_BENCH_RATE") {
            self.rate = rate.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_RATE value '{}': {}", rate, e)))?;
        }

        if let Some(duration) = lookup("CHAT_BENCH_DURATION") {
            self.duration_seconds = duration.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_DURATION value '{}': {}", duration, e)))?;
        }

        if let Some(msg_size) = lookup("CHAT_BENCH_MSG_SIZE") {
            self.msg_size = msg_size.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_MSG_SIZE value '{}': {}", msg_size, e)))?;
        }

        if let Some(timeout) = lookup("CHAT_BENCH_REPLY_TIMEOUT") {
            self.reply_timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_REPLY_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Some(timeout) = lookup("CHAT_BENCH_CONNECT_TIMEOUT") {
            self.connect_timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_CONNECT_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Some(pacing) = lookup("CHAT_BENCH_PACING") {
            self.pacing = pacing.parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_PACING value '{}': {}", pacing, e)))?;
        }

        if let Some(enable_color) = lookup("CHAT_BENCH_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_host() -> String {
    defaults::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    defaults::DEFAULT_PORT
}

fn default_clients() -> usize {
    defaults::DEFAULT_CLIENTS
}

fn default_rate() -> f64 {
    defaults::DEFAULT_RATE
}

fn default_duration_secs() -> u64 {
    defaults::DEFAULT_DURATION.as_secs()
}

fn default_msg_size() -> usize {
    defaults::DEFAULT_MSG_SIZE
}

fn default_reply_timeout_secs() -> u64 {
    defaults::DEFAULT_REPLY_TIMEOUT.as_secs()
}

fn default_connect_timeout_secs() -> u64 {
    defaults::DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
