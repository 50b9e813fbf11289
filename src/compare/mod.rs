//! Cross-experiment comparison.
//!
//! Compares the proposed method against each baseline on two axes:
//! relative P99.9 improvement and absolute deadline-miss-rate reduction.

use crate::error::{Result, TailbenchError};
use crate::model::{Experiment, ExperimentMap, StatisticsSummary, SummaryRecord};
use serde::Serialize;

/// Read access to the two comparison axes of a summary.
pub trait TailMetrics {
    fn percentile_value(&self, level: f64) -> Option<f64>;
    fn miss_rate(&self) -> Option<f64>;
}

impl TailMetrics for StatisticsSummary {
    fn percentile_value(&self, level: f64) -> Option<f64> {
        self.percentile(level)
    }

    fn miss_rate(&self) -> Option<f64> {
        self.deadline_miss_rate
    }
}

impl TailMetrics for SummaryRecord {
    fn percentile_value(&self, level: f64) -> Option<f64> {
        self.percentile(level)
    }

    fn miss_rate(&self) -> Option<f64> {
        self.deadline_miss_rate()
    }
}

/// Percentile level used as the tail-latency comparison axis.
pub const TAIL_LEVEL: f64 = 99.9;

/// Improvement of the proposed method over one reference experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub reference: Experiment,
    /// Percentage reduction in P99.9 latency (positive = proposed is faster).
    pub tail_improvement: f64,
    /// Miss-rate reduction in percentage points (positive = proposed misses less).
    pub miss_reduction: f64,
}

/// Relative reduction of `proposed` against `reference`, in percent.
///
/// The denominator is floored at 1 so a zero baseline does not divide by zero.
#[must_use]
pub fn tail_improvement(reference: f64, proposed: f64) -> f64 {
    (reference - proposed) / reference.max(1.0) * 100.0
}

/// Absolute miss-rate reduction in percentage points.
#[must_use]
pub fn miss_reduction(reference: f64, proposed: f64) -> f64 {
    reference - proposed
}

/// Compare `proposed` against `reference`.
///
/// A missing P99.9 or miss rate reads as zero.
#[must_use]
pub fn compare_pair<T: TailMetrics>(
    reference_experiment: Experiment,
    reference: &T,
    proposed: &T,
) -> ComparisonResult {
    let tail = |s: &T| s.percentile_value(TAIL_LEVEL).unwrap_or(0.0);
    let misses = |s: &T| s.miss_rate().unwrap_or(0.0);

    ComparisonResult {
        reference: reference_experiment,
        tail_improvement: tail_improvement(tail(reference), tail(proposed)),
        miss_reduction: miss_reduction(misses(reference), misses(proposed)),
    }
}

/// Compare the proposed method against baseline-1 and, when present,
/// baseline-2.
///
/// # Errors
///
/// Returns `MissingExperiment` if baseline-1 or the proposed method has no
/// summary.
pub fn compare<T: TailMetrics>(summaries: &ExperimentMap<T>) -> Result<Vec<ComparisonResult>> {
    let proposed = require(summaries, Experiment::Proposed)?;
    let baseline = require(summaries, Experiment::Baseline1)?;

    let mut results = vec![compare_pair(Experiment::Baseline1, baseline, proposed)];
    if let Some(alternative) = summaries.get(Experiment::Baseline2) {
        results.push(compare_pair(Experiment::Baseline2, alternative, proposed));
    }
    Ok(results)
}

fn require<T>(summaries: &ExperimentMap<T>, experiment: Experiment) -> Result<&T> {
    summaries
        .get(experiment)
        .ok_or(TailbenchError::MissingExperiment { experiment })
}
