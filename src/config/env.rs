//! Environment variable handling and .env file management

use crate::defaults;
use crate::error::{AppError, Result};
use crate::types::PacingStrategy;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if there is one
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a dotenv file. Variables already present in the process
    /// environment keep their value.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Example .env content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# chat-bench configuration\n\
             #\n\
             # Values here are defaults for every run. Real environment variables\n\
             # take precedence over this file, and command-line flags over both.\n",
        );

        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("\n# {}\n# {}={}\n", description, var, example));
        }

        content.push_str(
            "\n# Example: soak test with 200 slow clients\n\
             # CHAT_BENCH_CLIENTS=200\n\
             # CHAT_BENCH_RATE=0.2\n\
             # CHAT_BENCH_DURATION=600\n",
        );
        content
    }

    /// Check one variable's value without applying it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "CHAT_BENCH_HOST" => {
                if value.is_empty() {
                    return Err(AppError::config("CHAT_BENCH_HOST cannot be empty"));
                }
            }
            "CHAT_BENCH_PORT" => {
                let port: u16 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_PORT value '{}': {}", value, e)))?;
                if port == 0 {
                    return Err(AppError::config("CHAT_BENCH_PORT must be greater than 0"));
                }
            }
            "CHAT_BENCH_CLIENTS" => {
                check_range::<usize>(key, value, 1, defaults::MAX_CLIENTS)?;
            }
            "CHAT_BENCH_RATE" => {
                let rate: f64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if !(defaults::MIN_RATE..=defaults::MAX_RATE).contains(&rate) {
                    return Err(AppError::config(format!(
                        "{} must be between {} and {}, got: {}",
                        key,
                        defaults::MIN_RATE,
                        defaults::MAX_RATE,
                        value
                    )));
                }
            }
            "CHAT_BENCH_DURATION" => {
                check_range::<u64>(key, value, 1, defaults::MAX_DURATION_SECS)?;
            }
            "CHAT_BENCH_MSG_SIZE" => {
                check_range::<usize>(key, value, 0, defaults::MAX_MSG_SIZE)?;
            }
            "CHAT_BENCH_REPLY_TIMEOUT" | "CHAT_BENCH_CONNECT_TIMEOUT" => {
                check_range::<u64>(key, value, 1, defaults::MAX_TIMEOUT_SECS)?;
            }
            "CHAT_BENCH_PACING" => {
                value
                    .parse::<PacingStrategy>()
                    .map_err(|e| AppError::config(format!("Invalid CHAT_BENCH_PACING value '{}': {}", value, e)))?;
            }
            "CHAT_BENCH_ENABLE_COLOR" => {
                value.parse::<bool>().map_err(|e| {
                    AppError::config(format!("Invalid CHAT_BENCH_ENABLE_COLOR value '{}': {}", value, e))
                })?;
            }
            _ => {
                // not ours
            }
        }

        Ok(())
    }

    /// (name, description, example) for every supported variable
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("CHAT_BENCH_HOST", "Server host name or IP address", "127.0.0.1"),
            ("CHAT_BENCH_PORT", "Server TCP port", "2000"),
            ("CHAT_BENCH_CLIENTS", "Concurrent clients (1-100000)", "10"),
            ("CHAT_BENCH_RATE", "Messages per second per client", "1.0"),
            ("CHAT_BENCH_DURATION", "Test duration in seconds (1-86400)", "30"),
            ("CHAT_BENCH_MSG_SIZE", "Payload bytes per message (0-1048576)", "64"),
            ("CHAT_BENCH_REPLY_TIMEOUT", "Seconds to wait for each reply (1-300)", "5"),
            ("CHAT_BENCH_CONNECT_TIMEOUT", "Seconds to wait for the connection (1-300)", "5"),
            ("CHAT_BENCH_PACING", "schedule or fixed-delay", "schedule"),
            ("CHAT_BENCH_ENABLE_COLOR", "Enable colored output (true/false)", "true"),
        ]
    }

    pub fn display_env_help() -> String {
        let mut help = String::from("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for malformed variables in the current environment
    pub fn validate_current_env() -> Vec<String> {
        Self::validate_lookup(|key| std::env::var(key).ok())
    }

    /// Warnings for malformed variables as seen through `lookup`
    pub fn validate_lookup<F>(lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var, _, _)| {
                let value = lookup(var)?;
                Self::validate_env_var(var, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

fn check_range<T>(key: &str, value: &str, min: T, max: T) -> Result<()>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let parsed: T = value
        .parse()
        .map_err(|e: T::Err| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
    if parsed < min || parsed > max {
        return Err(AppError::config(format!(
            "{} must be between {} and {}, got: {}",
            key, min, max, parsed
        )));
    }
    Ok(())
}
