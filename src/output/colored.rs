//! Colored formatter implementation with terminal color support

use super::formatter::{format_elapsed, FormattingOptions, OutputFormatter, PlainFormatter, NO_REPLIES};
use crate::{
    error::{AppError, Result},
    executor::ExecutionSummary,
    models::{AggregateResult, SessionReport},
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Excellent, // < 1ms
    Good,      // 1-10ms
    Fair,      // 10-50ms
    Poor,      // 50-200ms
    VeryPoor,  // > 200ms
}

impl LatencyLevel {
    pub fn from_latency(ms: f64) -> Self {
        if ms < 1.0 {
            Self::Excellent
        } else if ms < 10.0 {
            Self::Good
        } else if ms < 50.0 {
            Self::Fair
        } else if ms < 200.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
///
/// Produces the same text as [`PlainFormatter`]; only ANSI styling is added.
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn latency(&self, ms: f64) -> ColoredString {
        self.colorize(&format!("{:.2} ms", ms), LatencyLevel::from_latency(ms).color())
    }

    fn count(&self, value: usize, color: Color) -> ColoredString {
        if value == 0 {
            self.colorize(&value.to_string(), self.color_scheme.muted)
        } else {
            self.colorize(&value.to_string(), color)
        }
    }
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format report: {}", e))
}

impl OutputFormatter for ColoredFormatter {
    fn format_report(&self, aggregate: &AggregateResult) -> Result<String> {
        let p = &aggregate.parameters;
        let mut output = String::new();

        writeln!(
            output,
            "{} {}, {} {} msg/s, {} {}s",
            self.bold("Clients:"),
            p.clients,
            self.bold("Rate/client:"),
            p.rate_per_client,
            self.bold("Duration:"),
            p.duration_s
        )
        .map_err(fmt_err)?;
        writeln!(output, "Total messages sent: {}", self.bold(&aggregate.total_msgs().to_string()))
            .map_err(fmt_err)?;

        match &aggregate.summary {
            Some(s) => {
                writeln!(output, "Mean latency:    {}", self.latency(s.mean_ms)).map_err(fmt_err)?;
                writeln!(output, "Median latency:  {}", self.latency(s.median_ms)).map_err(fmt_err)?;
                writeln!(output, "95th percentile: {}", self.latency(s.p95_ms)).map_err(fmt_err)?;
                write!(output, "99th percentile: {}", self.latency(s.p99_ms)).map_err(fmt_err)?;
            }
            None => write!(output, "{}", self.colorize(NO_REPLIES, self.color_scheme.warning)).map_err(fmt_err)?,
        }

        Ok(output)
    }

    fn format_session_table(&self, reports: &[SessionReport]) -> Result<String> {
        if reports.is_empty() {
            return Ok(self
                .colorize("No sessions were started.", self.color_scheme.muted)
                .to_string());
        }

        // Build the table uncolored so widths are computed on visible text,
        // then tint whole lines by outcome.
        let format = self.plain_formatter.session_table_format();
        let rows: Vec<_> = reports.iter().map(PlainFormatter::session_row).collect();
        let table = self.plain_formatter.create_table(&format, &rows);

        let header_lines = if format.show_borders { 3 } else { 1 };
        let mut output = String::new();
        for (idx, line) in table.lines().enumerate() {
            let styled = if line.starts_with('+') {
                self.colorize(line, self.color_scheme.border)
            } else if idx < header_lines {
                self.emphasize(line, self.color_scheme.header)
            } else {
                match reports.get(idx - header_lines) {
                    Some(r) if r.termination.is_failure() => self.colorize(line, self.color_scheme.error),
                    _ => line.normal(),
                }
            };
            if idx > 0 {
                output.push('\n');
            }
            write!(output, "{}", styled).map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_run_footer(&self, summary: &ExecutionSummary, aggregate: &AggregateResult) -> Result<String> {
        let tally = &aggregate.sessions;
        let mut output = String::new();

        writeln!(
            output,
            "Sessions: {} completed, {} stopped, {} failed ({} could not connect)",
            self.count(tally.completed, self.color_scheme.success),
            self.count(tally.stopped, self.color_scheme.warning),
            self.count(tally.failed, self.color_scheme.error),
            self.count(tally.connect_failures, self.color_scheme.error),
        )
        .map_err(fmt_err)?;
        writeln!(
            output,
            "Frames written: {}, unanswered: {}",
            aggregate.frames_sent,
            aggregate.frames_sent.saturating_sub(aggregate.total_msgs() as u64)
        )
        .map_err(fmt_err)?;
        if let Some(s) = &aggregate.summary {
            writeln!(
                output,
                "Min/Max latency: {} / {} (std dev {:.2} ms), {}",
                self.latency(s.min_ms),
                self.latency(s.max_ms),
                s.std_dev_ms,
                self.colorize(
                    LatencyLevel::from_latency(s.p99_ms).description(),
                    LatencyLevel::from_latency(s.p99_ms).color()
                )
            )
            .map_err(fmt_err)?;
        }
        writeln!(
            output,
            "Elapsed: {}, throughput: {:.1} msg/s",
            format_elapsed(summary.total_duration.as_secs_f64()),
            aggregate.throughput()
        )
        .map_err(fmt_err)?;
        if summary.interrupted {
            writeln!(
                output,
                "{}",
                self.colorize("Run was interrupted before the configured duration", self.color_scheme.warning)
            )
            .map_err(fmt_err)?;
        }
        write!(output, "Run ID: {}", self.colorize(&summary.run_id, self.color_scheme.muted)).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("WARNING:", self.color_scheme.warning), warning))
    }
}
