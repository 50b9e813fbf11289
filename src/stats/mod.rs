//! Statistics engine.
//!
//! Percentiles use linear interpolation between the two nearest order
//! statistics (rank `p/100 * (n - 1)`), not nearest-rank. Standard deviation
//! is the population form.

pub mod cdf;

use crate::error::{Result, TailbenchError};
use crate::model::{PercentileValue, StatisticsSummary, Unit};

pub use cdf::generate_cdf;

/// A non-empty, unit-scaled, ascending sample set.
///
/// Construction consumes the raw samples so that only one copy of a large
/// dataset is alive at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedSamples {
    values: Vec<f64>,
    unit: Unit,
}

impl SortedSamples {
    /// Scale nanosecond samples into `unit` and sort them.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDataset` if `samples` is empty.
    pub fn new(mut samples: Vec<f64>, unit: Unit) -> Result<Self> {
        if samples.is_empty() {
            return Err(TailbenchError::EmptyDataset {
                operation: "statistics",
            });
        }
        let divisor = unit.divisor();
        for value in &mut samples {
            *value /= divisor;
        }
        samples.sort_by(f64::total_cmp);
        Ok(Self {
            values: samples,
            unit,
        })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.values[0]
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation.
    #[must_use]
    pub fn stddev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;
        variance.sqrt()
    }

    /// Interpolated percentile, `level` in [0, 100].
    #[must_use]
    pub fn percentile(&self, level: f64) -> f64 {
        percentile_sorted(&self.values, level)
    }

    /// Percentage of samples strictly above `deadline`.
    #[must_use]
    pub fn miss_rate(&self, deadline: f64) -> f64 {
        let first_miss = self.values.partition_point(|v| *v <= deadline);
        (self.values.len() - first_miss) as f64 / self.values.len() as f64 * 100.0
    }

    /// Compute the full summary for the given levels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPercentile` if a level is outside [0, 100].
    pub fn summarize(&self, levels: &[f64], deadline: Option<f64>) -> Result<StatisticsSummary> {
        let levels = validate_levels(levels)?;
        Ok(StatisticsSummary {
            total_samples: self.len(),
            unit: self.unit,
            mean: self.mean(),
            stddev: self.stddev(),
            min: self.min(),
            max: self.max(),
            percentiles: levels
                .into_iter()
                .map(|level| PercentileValue {
                    level,
                    value: self.percentile(level),
                })
                .collect(),
            deadline_miss_rate: deadline.map(|d| self.miss_rate(d)),
        })
    }
}

/// Compute a summary over raw nanosecond samples.
///
/// # Errors
///
/// Returns `EmptyDataset` for empty input and `InvalidPercentile` for a level
/// outside [0, 100].
pub fn compute_summary(
    samples: &[f64],
    unit: Unit,
    levels: &[f64],
    deadline: Option<f64>,
) -> Result<StatisticsSummary> {
    SortedSamples::new(samples.to_vec(), unit)?.summarize(levels, deadline)
}

/// Sort and de-duplicate percentile levels, rejecting out-of-range values.
///
/// # Errors
///
/// Returns `InvalidPercentile` for non-finite levels or levels outside
/// [0, 100].
pub fn validate_levels(levels: &[f64]) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(levels.len());
    for &level in levels {
        if !level.is_finite() || !(0.0..=100.0).contains(&level) {
            return Err(TailbenchError::InvalidPercentile {
                level: level.to_string(),
            });
        }
        out.push(level);
    }
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| a.total_cmp(b).is_eq());
    Ok(out)
}

/// Interpolated percentile of an ascending, non-empty slice.
fn percentile_sorted(sorted: &[f64], level: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (level / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Median of unsorted samples; `None` when empty.
#[must_use]
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, 50.0))
}
