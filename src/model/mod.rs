//! Core data types for `tailbench`.
//!
//! - `Unit` - output latency unit and its divisor from nanoseconds
//! - `Experiment` - the closed set of compared experiments
//! - `ExperimentMap` - fixed-size map keyed by `Experiment`
//! - `StatisticsSummary` - per-experiment statistics record
//! - `CdfCurve` - fixed-resolution percentile/latency curve

use crate::error::{Result, TailbenchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percentile levels reported by default.
pub const DEFAULT_PERCENTILES: &[f64] = &[50.0, 90.0, 95.0, 99.0, 99.5, 99.9, 99.99];

/// Number of CDF steps (the curve has one more point than this).
pub const DEFAULT_CDF_POINTS: usize = 10_000;

/// Output latency unit. Samples are stored in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Ns,
    #[default]
    Us,
    Ms,
}

impl Unit {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ns => "ns",
            Self::Us => "us",
            Self::Ms => "ms",
        }
    }

    /// Divisor applied to nanosecond samples.
    #[must_use]
    pub const fn divisor(&self) -> f64 {
        match self {
            Self::Ns => 1.0,
            Self::Us => 1_000.0,
            Self::Ms => 1_000_000.0,
        }
    }

    /// Symbol used in human-readable reports.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Ns => "ns",
            Self::Us => "μs",
            Self::Ms => "ms",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = TailbenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ns" => Ok(Self::Ns),
            "us" | "μs" | "µs" => Ok(Self::Us),
            "ms" => Ok(Self::Ms),
            other => Err(TailbenchError::InvalidUnit {
                unit: other.to_string(),
            }),
        }
    }
}

/// One of the three compared experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Experiment {
    /// Power-of-two-choices scheduling.
    #[serde(rename = "baseline-1")]
    Baseline1,
    /// Original Malcolm (Nash equilibrium) scheduling.
    #[serde(rename = "baseline-2")]
    Baseline2,
    /// Malcolm-Strict, the proposed method.
    Proposed,
}

impl Experiment {
    pub const ALL: [Self; 3] = [Self::Baseline1, Self::Baseline2, Self::Proposed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline1 => "baseline-1",
            Self::Baseline2 => "baseline-2",
            Self::Proposed => "proposed",
        }
    }

    /// Directory name of this experiment under the results directory.
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Baseline1 => "exp_a_po2",
            Self::Baseline2 => "exp_b_malcolm",
            Self::Proposed => "exp_c_malcolm_strict",
        }
    }

    /// Section title in the text report.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Baseline1 => "Experiment A: Power-of-2 (Baseline 1)",
            Self::Baseline2 => "Experiment B: Original Malcolm (Baseline 2)",
            Self::Proposed => "Experiment C: Malcolm-Strict (Our Method)",
        }
    }

    /// Scheduler name used in comparison headings.
    #[must_use]
    pub const fn policy_name(&self) -> &'static str {
        match self {
            Self::Baseline1 => "Power-of-2",
            Self::Baseline2 => "Original Malcolm",
            Self::Proposed => "Malcolm-Strict",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Baseline1 => 0,
            Self::Baseline2 => 1,
            Self::Proposed => 2,
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Experiment {
    type Err = TailbenchError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|exp| exp.as_str() == normalized || exp.dir_name() == normalized)
            .ok_or_else(|| TailbenchError::Config(format!("Unknown experiment: {s}")))
    }
}

/// Fixed-size associative structure keyed by `Experiment`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentMap<T> {
    slots: [Option<T>; 3],
}

impl<T> Default for ExperimentMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<T> ExperimentMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous one.
    pub fn insert(&mut self, experiment: Experiment, value: T) -> Option<T> {
        self.slots[experiment.index()].replace(value)
    }

    #[must_use]
    pub fn get(&self, experiment: Experiment) -> Option<&T> {
        self.slots[experiment.index()].as_ref()
    }

    #[must_use]
    pub fn contains(&self, experiment: Experiment) -> bool {
        self.get(experiment).is_some()
    }

    /// Present entries in `Experiment::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Experiment, &T)> {
        Experiment::ALL
            .into_iter()
            .filter_map(|exp| self.get(exp).map(|value| (exp, value)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value computed at one percentile level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub level: f64,
    pub value: f64,
}

impl PercentileValue {
    /// Summary key for this level, e.g. `P50` or `P99.9`.
    #[must_use]
    pub fn label(&self) -> String {
        percentile_label(self.level)
    }
}

/// Format a percentile level as its summary key.
///
/// Uses the shortest round-trip representation so `50.0` becomes `P50` and
/// `99.99` stays `P99.99`.
#[must_use]
pub fn percentile_label(level: f64) -> String {
    format!("P{level}")
}

/// Statistics for one experiment's merged samples, in `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_samples: usize,
    pub unit: Unit,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Vec<PercentileValue>,
    /// Percentage of samples above the configured deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_miss_rate: Option<f64>,
}

impl StatisticsSummary {
    /// Look up a percentile by level.
    #[must_use]
    pub fn percentile(&self, level: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| (p.level - level).abs() < 1e-9)
            .map(|p| p.value)
    }
}

/// Summary key for the sample count.
pub const KEY_TOTAL_SAMPLES: &str = "Total Samples";
/// Sample-count key written by the benchmark workers themselves.
pub const KEY_TOTAL_REQUESTS: &str = "Total Requests";
pub const KEY_UNIT: &str = "Unit";
pub const KEY_MEAN: &str = "Mean";
pub const KEY_STDDEV: &str = "Stddev";
pub const KEY_MIN: &str = "Min";
pub const KEY_MAX: &str = "Max";
pub const KEY_MISS_RATE: &str = "Deadline Miss Rate";

/// A value re-loaded from a summary artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Number(f64),
    Text(String),
}

impl SummaryValue {
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered `key: value` record as re-loaded from a summary file.
///
/// Unknown keys are kept. Besides the keys written by `tailbench merge`, the
/// per-worker `summary.txt` layout (`Total Requests`, `P99 Latency (us)`) is
/// understood.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryRecord {
    entries: Vec<(String, SummaryValue)>,
}

impl SummaryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping first-insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: SummaryValue) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SummaryValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(SummaryValue::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_samples(&self) -> Option<f64> {
        self.number(KEY_TOTAL_SAMPLES)
            .or_else(|| self.number(KEY_TOTAL_REQUESTS))
    }

    #[must_use]
    pub fn unit(&self) -> Option<Unit> {
        match self.get(KEY_UNIT)? {
            SummaryValue::Text(s) => s.parse().ok(),
            SummaryValue::Number(_) => None,
        }
    }

    /// Percentile by level: `P99.9`, or a worker key such as `P99.9 Latency (us)`.
    #[must_use]
    pub fn percentile(&self, level: f64) -> Option<f64> {
        let label = percentile_label(level);
        self.number(&label).or_else(|| {
            let prefix = format!("{label} ");
            self.entries
                .iter()
                .find(|(k, _)| k.starts_with(&prefix))
                .and_then(|(_, v)| v.as_f64())
        })
    }

    #[must_use]
    pub fn deadline_miss_rate(&self) -> Option<f64> {
        self.number(KEY_MISS_RATE)
    }
}

impl From<&StatisticsSummary> for SummaryRecord {
    fn from(summary: &StatisticsSummary) -> Self {
        let mut record = Self::new();
        record.insert(
            KEY_TOTAL_SAMPLES,
            SummaryValue::Number(summary.total_samples as f64),
        );
        record.insert(KEY_UNIT, SummaryValue::Text(summary.unit.to_string()));
        record.insert(KEY_MEAN, SummaryValue::Number(summary.mean));
        record.insert(KEY_STDDEV, SummaryValue::Number(summary.stddev));
        record.insert(KEY_MIN, SummaryValue::Number(summary.min));
        record.insert(KEY_MAX, SummaryValue::Number(summary.max));
        for p in &summary.percentiles {
            record.insert(p.label(), SummaryValue::Number(p.value));
        }
        if let Some(rate) = summary.deadline_miss_rate {
            record.insert(KEY_MISS_RATE, SummaryValue::Number(rate));
        }
        record
    }
}

/// One point of a CDF curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdfPoint {
    pub percentile: f64,
    pub latency: f64,
}

/// Percentile-spaced cumulative distribution curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CdfCurve {
    pub unit: Unit,
    pub points: Vec<CdfPoint>,
}

impl CdfCurve {
    /// Points at or above the given percentile (tail zoom).
    #[must_use]
    pub fn tail(&self, from_percentile: f64) -> Vec<CdfPoint> {
        self.points
            .iter()
            .copied()
            .filter(|p| p.percentile >= from_percentile)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_divisors() {
        assert!((Unit::Ns.divisor() - 1.0).abs() < f64::EPSILON);
        assert!((Unit::Us.divisor() - 1_000.0).abs() < f64::EPSILON);
        assert!((Unit::Ms.divisor() - 1_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("US".parse::<Unit>().unwrap(), Unit::Us);
        assert_eq!("ms".parse::<Unit>().unwrap(), Unit::Ms);
        assert!(matches!(
            "s".parse::<Unit>(),
            Err(TailbenchError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn percentile_labels() {
        assert_eq!(percentile_label(50.0), "P50");
        assert_eq!(percentile_label(99.5), "P99.5");
        assert_eq!(percentile_label(99.9), "P99.9");
        assert_eq!(percentile_label(99.99), "P99.99");
    }

    #[test]
    fn experiment_parses_name_or_dir() {
        assert_eq!(
            "baseline-1".parse::<Experiment>().unwrap(),
            Experiment::Baseline1
        );
        assert_eq!(
            "exp_c_malcolm_strict".parse::<Experiment>().unwrap(),
            Experiment::Proposed
        );
        assert!("exp_d".parse::<Experiment>().is_err());
    }

    #[test]
    fn experiment_map_iterates_in_fixed_order() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Proposed, 3);
        map.insert(Experiment::Baseline1, 1);
        let order: Vec<_> = map.iter().map(|(exp, v)| (exp, *v)).collect();
        assert_eq!(
            order,
            vec![(Experiment::Baseline1, 1), (Experiment::Proposed, 3)]
        );
        assert_eq!(map.len(), 2);
        assert!(!map.contains(Experiment::Baseline2));
    }

    #[test]
    fn cdf_tail_filters_points() {
        let curve = CdfCurve {
            unit: Unit::Us,
            points: vec![
                CdfPoint {
                    percentile: 50.0,
                    latency: 1.0,
                },
                CdfPoint {
                    percentile: 99.0,
                    latency: 2.0,
                },
                CdfPoint {
                    percentile: 100.0,
                    latency: 3.0,
                },
            ],
        };
        assert_eq!(curve.tail(99.0).len(), 2);
    }

    #[test]
    fn summary_record_understands_worker_keys() {
        let mut record = SummaryRecord::new();
        record.insert("Total Requests", SummaryValue::Number(42.0));
        record.insert("P99 Latency (us)", SummaryValue::Number(9.0));
        record.insert("P99.9 Latency (us)", SummaryValue::Number(12.0));
        assert_eq!(record.total_samples(), Some(42.0));
        assert_eq!(record.percentile(99.0), Some(9.0));
        assert_eq!(record.percentile(99.9), Some(12.0));
        assert_eq!(record.percentile(50.0), None);
        assert_eq!(record.deadline_miss_rate(), None);
    }

    #[test]
    fn summary_record_from_statistics() {
        let summary = StatisticsSummary {
            total_samples: 3,
            unit: Unit::Ms,
            mean: 2.0,
            stddev: 1.0,
            min: 1.0,
            max: 3.0,
            percentiles: vec![PercentileValue {
                level: 50.0,
                value: 2.0,
            }],
            deadline_miss_rate: Some(33.3),
        };
        let record = SummaryRecord::from(&summary);
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "Total Samples",
                "Unit",
                "Mean",
                "Stddev",
                "Min",
                "Max",
                "P50",
                "Deadline Miss Rate"
            ]
        );
        assert_eq!(record.unit(), Some(Unit::Ms));
        assert_eq!(record.percentile(50.0), Some(2.0));
    }
}
