//! chat-bench - load generator for line-delimited TCP chat and echo services
//!
//! Opens N concurrent connections, sends random frames at a fixed rate per
//! connection and reports round-trip latency statistics.

use chat_bench::{
    app::App,
    cli::Cli,
    config::EnvManager,
    error::{AppError, ErrorReporter},
};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let use_color = !cli.no_color && (cli.color || chat_bench::cli::supports_color());
    let verbose = cli.verbose;

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        ErrorReporter::new(use_color, verbose).report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Run with --help for accepted flags and ranges");
            eprintln!("  - Check CHAT_BENCH_* variables and your .env file");
            eprintln!("  - Use --env-example to print a documented .env template");
            for problem in EnvManager::validate_current_env() {
                eprintln!("  - {}", problem);
            }
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Check the open file limit (ulimit -n) for large client counts");
            eprintln!("  - Run with --debug for per-session events");
        }
        _ => {}
    }
}
