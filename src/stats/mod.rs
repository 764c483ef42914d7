//! Latency aggregation
//!
//! Pools the samples of every session and reduces them to a
//! [`LatencySummary`]. Percentiles use the nearest-rank method computed in
//! integer arithmetic, so p95 of `1..=100` is exactly 95 and p99 is 99.

use crate::models::{LatencySummary, SessionReport};

/// Accumulates per-session latency sets in index order
#[derive(Debug, Default)]
pub struct LatencyAggregator {
    samples: Vec<f64>,
    sessions: usize,
}

impl LatencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one session's samples
    pub fn add_samples(&mut self, samples: &[f64]) {
        self.samples.extend_from_slice(samples);
        self.sessions += 1;
    }

    /// Append the samples of every report, in the order given
    pub fn add_reports(&mut self, reports: &[SessionReport]) {
        for report in reports {
            self.add_samples(&report.latencies_ms);
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
    }

    /// Concatenated samples, session order preserved
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn summarize(&self) -> Option<LatencySummary> {
        aggregate(&self.samples)
    }
}

/// Reduce a sample set to summary statistics. `None` for an empty set.
pub fn aggregate(samples: &[f64]) -> Option<LatencySummary> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(LatencySummary {
        count,
        mean_ms: mean,
        median_ms: median(&sorted),
        p95_ms: nearest_rank(&sorted, 95),
        p99_ms: nearest_rank(&sorted, 99),
        min_ms: sorted[0],
        max_ms: sorted[count - 1],
        std_dev_ms: std_dev(&sorted, mean),
    })
}

/// Nearest-rank percentile of an ascending, non-empty slice.
///
/// The 1-indexed rank is `ceil(percent * n / 100)`, clamped to `1..=n`.
pub fn nearest_rank(sorted: &[f64], percent: u32) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let rank = (percent as usize * n).div_ceil(100).clamp(1, n);
    sorted[rank - 1]
}

/// Middle value, or mean of the two middle values for even lengths
pub fn median(sorted: &[f64]) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
