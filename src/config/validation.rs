//! Advisory configuration checks
//!
//! [`Config::validate`] rejects configurations that cannot run. The checks
//! here accept the configuration but point out settings that are likely to
//! produce misleading numbers.

use crate::error::Result;
use crate::models::Config;
use colored::Colorize;
use std::net::IpAddr;

/// Aggregate frames per second above which the generator itself may become
/// the bottleneck
const HIGH_AGGREGATE_RATE: f64 = 10_000.0;
/// Roughly where default per-process file descriptor limits start to bite
const MANY_CLIENTS: usize = 1_000;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Hard validation followed by advisory checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_load_shape(config));
        warnings.extend(Self::validate_timeouts(config));
        warnings.extend(Self::validate_payload(config));
        warnings.extend(Self::validate_target(config));
        Ok(warnings)
    }

    fn validate_load_shape(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let aggregate = config.clients as f64 * config.rate;

        if aggregate > HIGH_AGGREGATE_RATE {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} clients x {} msg/s is {:.0} msg/s in total; the load generator may saturate before the server does",
                    config.clients, config.rate, aggregate
                ),
            ));
        }

        if config.clients > MANY_CLIENTS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} clients need as many open sockets; check the file descriptor limit (ulimit -n)",
                    config.clients
                ),
            ));
        }

        // fewer than one send per client per run
        if config.rate * (config.duration_seconds as f64) < 1.0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "At {} msg/s for {}s each client sends a single message",
                    config.rate, config.duration_seconds
                ),
            ));
        }

        warnings
    }

    fn validate_timeouts(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.reply_timeout_seconds >= config.duration_seconds {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Reply timeout ({}s) is not shorter than the test ({}s); a stalled server will not be detected before the run ends",
                    config.reply_timeout_seconds, config.duration_seconds
                ),
            ));
        }

        warnings
    }

    fn validate_payload(config: &Config) -> Vec<ValidationWarning> {
        if config.msg_size == 0 {
            vec![ValidationWarning::new(
                ValidationLevel::Info,
                "Message size is 0; every frame is a bare newline".to_string(),
            )]
        } else {
            Vec::new()
        }
    }

    fn validate_target(config: &Config) -> Vec<ValidationWarning> {
        if Self::is_loopback_host(&config.host) {
            return Vec::new();
        }

        vec![ValidationWarning::new(
            ValidationLevel::Info,
            format!(
                "Target {} is not a loopback address; latencies include network transit",
                config.target()
            ),
        )]
    }

    fn is_loopback_host(host: &str) -> bool {
        let host = host.trim().trim_start_matches('[').trim_end_matches(']');
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }
        host.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        let tag = if use_color {
            match self.level {
                ValidationLevel::Info => tag.blue().to_string(),
                ValidationLevel::Warning => tag.yellow().to_string(),
            }
        } else {
            tag
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
