//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    executor::{ClientPool, ExecutionResults},
    logging::{Logger, LoggerFactory},
    models::Config,
    output::OutputCoordinator,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::validation)?;
        Ok(Self { cli })
    }

    /// Run the application
    ///
    /// Session failures are part of the measurement and do not make the run
    /// fail; only configuration and setup problems return `Err`.
    pub async fn run(self) -> Result<()> {
        if self.cli.env_example {
            print!("{}", EnvManager::create_example_env_content());
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;

        if config.debug {
            eprintln!("{}", build_banner());
            eprintln!("{}", self.cli.get_config_summary());
            eprintln!("Effective configuration:\n{}", display_config_summary(&config));
        }

        for warning in &warnings {
            eprintln!("{}", warning.format(config.enable_color));
        }

        let factory = LoggerFactory::new(config.clone());
        let logger = Arc::new(factory.create_logger("chat-bench").await);

        let results = Self::execute(&config, &factory, logger.clone()).await?;
        Self::report(&config, &results, &logger).await
    }

    async fn execute(config: &Config, factory: &LoggerFactory, logger: Arc<Logger>) -> Result<ExecutionResults> {
        crate::log_info!(
            logger,
            "Run {} using {} pacing, {} byte frames, {}s reply timeout",
            factory.run_id(),
            config.pacing,
            config.msg_size,
            config.reply_timeout_seconds
        );

        let pool = ClientPool::new(config, logger).with_run_id(factory.run_id());
        pool.run_test_until(interrupt()).await
    }

    async fn report(config: &Config, results: &ExecutionResults, logger: &Logger) -> Result<()> {
        let coordinator = OutputCoordinator::from_config(config);
        println!("{}", coordinator.display_results(results)?);

        let reporter = ErrorReporter::new(config.enable_color, config.verbose);
        if let Some(failures) = coordinator.display_failures(results, &reporter)? {
            eprintln!("{}", failures);
        }

        if results.aggregate.is_empty() {
            crate::log_warn!(
                logger,
                "No replies were received from {}; check that the server is running and echoes each line",
                config.target()
            );
        }

        Ok(())
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the run is simply
/// not interruptible.
async fn interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Version line with build metadata
pub fn build_banner() -> String {
    format!(
        "{} v{} (built {}, commit {})",
        crate::PKG_NAME,
        crate::VERSION,
        env!("BUILD_TIME"),
        option_env!("GIT_COMMIT").unwrap_or("unknown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_conflicting_color_flags_are_rejected() {
        let cli = Cli {
            color: true,
            no_color: true,
            ..Default::default()
        };
        let err = App::new(cli).err().unwrap();
        assert_eq!(err.category(), "VALIDATION");
    }

    #[test]
    fn test_build_banner() {
        let banner = build_banner();
        assert!(banner.starts_with("chat-bench v"));
        assert!(banner.contains("commit"));
    }

    #[tokio::test]
    async fn test_env_example_short_circuits() {
        let cli = Cli::parse_from(["chat-bench", "--env-example", "--port", "1"]);
        assert!(cli.env_example);
        assert!(App::new(cli).unwrap().run().await.is_ok());
    }
}
