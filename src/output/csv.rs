//! Single-record CSV output

use crate::models::AggregateResult;

/// Column names, in record order
pub const CSV_HEADER: &str =
    "clients,rate_per_client,duration_s,msg_size,total_msgs,mean_lat_ms,p95_lat_ms,p99_lat_ms";

/// Renders one comma-separated record per run, optionally preceded by
/// [`CSV_HEADER`]
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    include_header: bool,
}

impl CsvFormatter {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }

    /// Latency columns are left empty when no reply arrived
    pub fn format_record(&self, aggregate: &AggregateResult) -> String {
        let p = &aggregate.parameters;
        let (mean, p95, p99) = match &aggregate.summary {
            Some(s) => (
                format!("{:.2}", s.mean_ms),
                format!("{:.2}", s.p95_ms),
                format!("{:.2}", s.p99_ms),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        let record = format!(
            "{},{},{},{},{},{},{},{}",
            p.clients,
            p.rate_per_client,
            p.duration_s,
            p.msg_size,
            aggregate.total_msgs(),
            mean,
            p95,
            p99
        );

        if self.include_header {
            format!("{}\n{}", CSV_HEADER, record)
        } else {
            record
        }
    }
}
