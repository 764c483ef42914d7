//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Builds a [`Config`] from defaults, `.env`, the environment and the CLI,
/// in increasing order of precedence
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`parse`](Self::parse) but reads variables through `lookup`
    /// and skips the `.env` file
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Only flags actually given on the command line override
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(host) = &cli.host {
            config.host = host.trim().to_string();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(clients) = cli.clients {
            config.clients = clients;
        }
        if let Some(rate) = cli.rate {
            config.rate = rate;
        }
        if let Some(duration) = cli.duration {
            config.duration_seconds = duration;
        }
        if let Some(msg_size) = cli.msg_size {
            config.msg_size = msg_size;
        }
        if let Some(timeout) = cli.reply_timeout {
            config.reply_timeout_seconds = timeout;
        }
        if let Some(timeout) = cli.connect_timeout {
            config.connect_timeout_seconds = timeout;
        }
        if let Some(pacing) = cli.pacing {
            config.pacing = pacing;
        }

        config.enable_color = match cli.color_override() {
            Some(forced) => forced,
            None => config.enable_color && crate::cli::supports_color(),
        };

        // CLI-only settings
        config.output_format = cli.output_format();
        config.csv_header = cli.csv_header;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Effective configuration, one setting per line
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Target: {}", config.target()),
        format!("Clients: {}", config.clients),
        format!("Rate per client: {} msg/s", config.rate),
        format!("Duration: {}s", config.duration_seconds),
        format!("Message size: {} bytes", config.msg_size),
        format!("Reply timeout: {}s", config.reply_timeout_seconds),
        format!("Connect timeout: {}s", config.connect_timeout_seconds),
        format!("Pacing: {}", config.pacing),
        format!("Output: {}", config.output_format.as_str()),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
