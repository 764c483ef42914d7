//! Report rendering
//!
//! A finished run is rendered in one of three shapes: the human-readable
//! report (plain or colored), a single CSV record, or a JSON document.

mod colored;
mod csv;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter, LatencyLevel};
pub use csv::{CsvFormatter, CSV_HEADER};
pub use formatter::{
    Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat,
    NO_REPLIES,
};
pub use json::JsonReport;

use crate::{
    error::{ErrorReporter, Result},
    executor::ExecutionResults,
    models::Config,
    types::OutputFormat,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            table_borders: true,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Plain text formatter for scripts and logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false)
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    format: OutputFormat,
    csv: CsvFormatter,
    verbose: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, format: OutputFormat, csv_header: bool, verbose: bool) -> Self {
        Self {
            formatter,
            format,
            csv: CsvFormatter::new(csv_header),
            verbose,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color),
            config.output_format,
            config.csv_header,
            config.verbose,
        )
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The report destined for stdout
    pub fn display_results(&self, results: &ExecutionResults) -> Result<String> {
        match self.format {
            OutputFormat::Csv => Ok(self.csv.format_record(&results.aggregate)),
            OutputFormat::Json => JsonReport::from_results(results, self.verbose).to_json(),
            OutputFormat::Human => {
                let mut output = self.formatter.format_report(&results.aggregate)?;

                if self.verbose {
                    output.push_str("\n\n");
                    output.push_str(&self.formatter.format_session_table(&results.reports)?);
                    output.push_str("\n\n");
                    output.push_str(&self.formatter.format_run_footer(&results.summary, &results.aggregate)?);
                }

                Ok(output)
            }
        }
    }

    /// Failure summary for stderr, `None` when every session succeeded
    pub fn display_failures(&self, results: &ExecutionResults, reporter: &ErrorReporter) -> Result<Option<String>> {
        if !results.has_failures() {
            return Ok(None);
        }

        let summary = reporter.format_session_failures(&results.failures());
        self.formatter.format_warning(&summary).map(Some)
    }
}
