//! Command-line interface

use crate::defaults;
use crate::types::{OutputFormat, PacingStrategy};
use clap::Parser;

/// Load generator for newline-delimited TCP chat servers.
///
/// Every client sends random letter frames at a fixed rate, waits for a
/// one-line reply to each and records the round trip. Flags left out fall
/// back to CHAT_BENCH_* environment variables, then to built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chat-bench")]
#[command(version, about, long_about = None)]
#[command(after_long_help = crate::config::EnvManager::display_env_help())]
pub struct Cli {
    /// Server host name or IP address [default: 127.0.0.1]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server TCP port [default: 2000]
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Number of concurrent clients [default: 10]
    #[arg(short, long, value_parser = parse_clients)]
    pub clients: Option<usize>,

    /// Messages per second per client [default: 1.0]
    #[arg(short, long, value_parser = parse_rate)]
    pub rate: Option<f64>,

    /// Test duration in seconds [default: 30]
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<u64>,

    /// Payload bytes per message, excluding the newline [default: 64]
    #[arg(long, value_parser = parse_msg_size)]
    pub msg_size: Option<usize>,

    /// Seconds to wait for each reply [default: 5]
    #[arg(long, value_parser = parse_timeout)]
    pub reply_timeout: Option<u64>,

    /// Seconds to wait for the TCP connection [default: 5]
    #[arg(long, value_parser = parse_timeout)]
    pub connect_timeout: Option<u64>,

    /// How sends are spaced [default: schedule]
    #[arg(long, value_enum)]
    pub pacing: Option<PacingStrategy>,

    /// Emit one CSV record instead of the text report
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Precede the CSV record with a header row (implies --csv)
    #[arg(long, conflicts_with = "json")]
    pub csv_header: bool,

    /// Emit the aggregate as JSON
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Per-session table and progress logging
    #[arg(long)]
    pub verbose: bool,

    /// Debug logging as JSON on stderr
    #[arg(long)]
    pub debug: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub env_example: bool,
}

impl Cli {
    /// Checks clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err("--host cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Explicit color choice, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.csv || self.csv_header {
            OutputFormat::Csv
        } else {
            OutputFormat::Human
        }
    }

    /// Flags given on this command line, for the debug banner
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::from("Command line overrides:\n");
        let mut any = false;
        let mut push = |name: &str, value: String| {
            summary.push_str(&format!("  {}: {}\n", name, value));
            any = true;
        };

        if let Some(host) = &self.host {
            push("host", host.clone());
        }
        if let Some(port) = self.port {
            push("port", port.to_string());
        }
        if let Some(clients) = self.clients {
            push("clients", clients.to_string());
        }
        if let Some(rate) = self.rate {
            push("rate", rate.to_string());
        }
        if let Some(duration) = self.duration {
            push("duration", format!("{}s", duration));
        }
        if let Some(size) = self.msg_size {
            push("msg-size", size.to_string());
        }
        if let Some(timeout) = self.reply_timeout {
            push("reply-timeout", format!("{}s", timeout));
        }
        if let Some(timeout) = self.connect_timeout {
            push("connect-timeout", format!("{}s", timeout));
        }
        if let Some(pacing) = self.pacing {
            push("pacing", pacing.to_string());
        }

        if !any {
            summary.push_str("  (none)\n");
        }
        summary
    }
}

fn parse_bounded<T>(s: &str, what: &str, min: T, max: T) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    // reject forms str::parse would accept but nobody means
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid {}: {}", what, s));
    }

    let value = s
        .trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid {}: {}", what, s))?;

    if value < min || value > max {
        return Err(format!("{} must be between {} and {}", what, min, max));
    }
    Ok(value)
}

fn parse_clients(s: &str) -> Result<usize, String> {
    parse_bounded(s, "client count", 1, defaults::MAX_CLIENTS)
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate = parse_bounded(s, "rate", defaults::MIN_RATE, defaults::MAX_RATE)?;
    if !rate.is_finite() {
        return Err(format!("Invalid rate: {}", s));
    }
    Ok(rate)
}

fn parse_duration(s: &str) -> Result<u64, String> {
    parse_bounded(s, "duration", 1, defaults::MAX_DURATION_SECS)
}

fn parse_msg_size(s: &str) -> Result<usize, String> {
    parse_bounded(s, "message size", 0, defaults::MAX_MSG_SIZE)
}

fn parse_timeout(s: &str) -> Result<u64, String> {
    parse_bounded(s, "timeout", 1, defaults::MAX_TIMEOUT_SECS)
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_leaves_everything_unset() {
        let cli = Cli::parse_from(["chat-bench"]);
        assert!(cli.host.is_none());
        assert!(cli.clients.is_none());
        assert!(cli.rate.is_none());
        assert_eq!(cli.output_format(), OutputFormat::Human);
        assert_eq!(cli.color_override(), None);
        assert!(cli.get_config_summary().contains("(none)"));
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::parse_from([
            "chat-bench",
            "--host", "10.0.0.5",
            "--port", "4000",
            "--clients", "50",
            "--rate", "2.5",
            "--duration", "10",
            "--msg-size", "0",
            "--reply-timeout", "2",
            "--connect-timeout", "3",
            "--pacing", "fixed-delay",
            "--csv",
            "--no-color",
            "--verbose",
        ]);

        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.port, Some(4000));
        assert_eq!(cli.clients, Some(50));
        assert_eq!(cli.rate, Some(2.5));
        assert_eq!(cli.duration, Some(10));
        assert_eq!(cli.msg_size, Some(0));
        assert_eq!(cli.reply_timeout, Some(2));
        assert_eq!(cli.connect_timeout, Some(3));
        assert_eq!(cli.pacing, Some(PacingStrategy::FixedDelay));
        assert_eq!(cli.output_format(), OutputFormat::Csv);
        assert_eq!(cli.color_override(), Some(false));
        assert!(cli.verbose);

        let summary = cli.get_config_summary();
        assert!(summary.contains("clients: 50"));
        assert!(summary.contains("pacing: fixed-delay"));
    }

    #[test]
    fn test_csv_header_implies_csv() {
        let cli = Cli::parse_from(["chat-bench", "--csv-header"]);
        assert_eq!(cli.output_format(), OutputFormat::Csv);
        assert!(cli.csv_header);
    }

    #[test]
    fn test_json_output() {
        let cli = Cli::parse_from(["chat-bench", "--json"]);
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert!(Cli::try_parse_from(["chat-bench", "--json", "--csv"]).is_err());
    }

    #[test]
    fn test_range_checks() {
        assert!(Cli::try_parse_from(["chat-bench", "--clients", "0"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--rate", "0"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--rate", "-1"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--rate", "NaN"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--duration", "0"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--duration", "86401"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--msg-size", "1048577"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--reply-timeout", "301"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--port", "0"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--pacing", "bursty"]).is_err());
        assert!(Cli::try_parse_from(["chat-bench", "--duration", "+5"]).is_err());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_duration("86400"), Ok(86_400));
        assert_eq!(parse_msg_size("1048576"), Ok(1_048_576));
        assert_eq!(parse_rate("0.5"), Ok(0.5));
        assert!(parse_rate("inf").is_err());
        assert!(parse_clients("abc").is_err());
        assert!(parse_timeout("0x10").is_err());
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["chat-bench", "--color", "--no-color"]).is_err());
        let cli = Cli::parse_from(["chat-bench", "--color"]);
        assert_eq!(cli.color_override(), Some(true));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let cli = Cli::parse_from(["chat-bench", "--host", " "]);
        assert!(cli.validate().is_err());
    }
}
