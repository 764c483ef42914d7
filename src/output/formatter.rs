//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    executor::ExecutionSummary,
    models::{AggregateResult, SessionReport},
};
use std::fmt::Write as _;

/// Renders the human-readable parts of a run report
pub trait OutputFormatter {
    /// The headline report: parameters, message count and latency figures
    fn format_report(&self, aggregate: &AggregateResult) -> Result<String>;

    /// One row per session
    fn format_session_table(&self, reports: &[SessionReport]) -> Result<String>;

    /// How sessions ended, wall-clock time and throughput
    fn format_run_footer(&self, summary: &ExecutionSummary, aggregate: &AggregateResult) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            table_borders: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
    /// Width cap for cells beyond the declared columns
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width,
            max_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Message printed instead of latency figures when nothing was acknowledged
pub const NO_REPLIES: &str = "No replies received: server unreachable or not acknowledging messages";

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub(crate) fn session_table_format(&self) -> TableFormat {
        TableFormat {
            columns: vec![
                Column::new("Client", Alignment::Right, 6, 8),
                Column::new("Result", Alignment::Left, 9, 9),
                Column::new("Sent", Alignment::Right, 6, 12),
                Column::new("Replies", Alignment::Right, 7, 12),
                Column::new("Mean", Alignment::Right, 10, 12),
                Column::new("Error", Alignment::Left, 5, 60),
            ],
            show_borders: self.options.table_borders,
            show_header: true,
            max_column_width: 60,
        }
    }

    pub(crate) fn session_row(report: &SessionReport) -> RowData {
        vec![
            report.index.to_string(),
            report.termination.label().to_string(),
            report.frames_sent.to_string(),
            report.samples().to_string(),
            report
                .mean_ms()
                .map(|ms| format!("{:.2} ms", ms))
                .unwrap_or_else(|| "-".to_string()),
            report
                .termination
                .error()
                .map(|e| e.kind().to_string())
                .unwrap_or_default(),
        ]
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format
            .columns
            .len()
            .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column
                    .map(|c| c.min_width.max(c.header.len()))
                    .unwrap_or(0);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                width.min(column.map_or(format.max_column_width, |c| c.max_width))
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format
                .columns
                .get(idx)
                .map(|c| &c.alignment)
                .unwrap_or(&Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&self.align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - len;
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }
}

/// Wall-clock duration with a unit suited to its size
pub(crate) fn format_elapsed(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else {
        let minutes = (seconds / 60.0) as u64;
        format!("{}m{:.1}s", minutes, seconds % 60.0)
    }
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format report: {}", e))
}

impl OutputFormatter for PlainFormatter {
    fn format_report(&self, aggregate: &AggregateResult) -> Result<String> {
        let p = &aggregate.parameters;
        let mut output = String::new();

        writeln!(
            output,
            "Clients: {}, Rate/client: {} msg/s, Duration: {}s",
            p.clients, p.rate_per_client, p.duration_s
        )
        .map_err(fmt_err)?;
        writeln!(output, "Total messages sent: {}", aggregate.total_msgs()).map_err(fmt_err)?;

        match &aggregate.summary {
            Some(s) => {
                writeln!(output, "Mean latency:    {:.2} ms", s.mean_ms).map_err(fmt_err)?;
                writeln!(output, "Median latency:  {:.2} ms", s.median_ms).map_err(fmt_err)?;
                writeln!(output, "95th percentile: {:.2} ms", s.p95_ms).map_err(fmt_err)?;
                write!(output, "99th percentile: {:.2} ms", s.p99_ms).map_err(fmt_err)?;
            }
            None => write!(output, "{}", NO_REPLIES).map_err(fmt_err)?,
        }

        Ok(output)
    }

    fn format_session_table(&self, reports: &[SessionReport]) -> Result<String> {
        if reports.is_empty() {
            return Ok("No sessions were started.".to_string());
        }

        let rows: Vec<RowData> = reports.iter().map(Self::session_row).collect();
        Ok(self.create_table(&self.session_table_format(), &rows))
    }

    fn format_run_footer(&self, summary: &ExecutionSummary, aggregate: &AggregateResult) -> Result<String> {
        let tally = &aggregate.sessions;
        let mut output = String::new();

        writeln!(
            output,
            "Sessions: {} completed, {} stopped, {} failed ({} could not connect)",
            tally.completed, tally.stopped, tally.failed, tally.connect_failures
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
                "Min/Max latency: {:.2} / {:.2} ms (std dev {:.2} ms)",
                s.min_ms, s.max_ms, s.std_dev_ms
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
            writeln!(output, "Run was interrupted before the configured duration").map_err(fmt_err)?;
        }
        write!(output, "Run ID: {}", summary.run_id).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }
}
