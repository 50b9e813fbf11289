//! Summary artifact: one `key: value` pair per line.
//!
//! ```text
//! Total Samples: 10
//! Unit: us
//! Mean: 55.0000
//! ...
//! P99.9: 99.9100
//! ```
//!
//! Readers tolerate a trailing `%` on any value and keep unknown keys.

use crate::error::{Result, TailbenchError};
use crate::model::{
    KEY_MAX, KEY_MEAN, KEY_MIN, KEY_MISS_RATE, KEY_STDDEV, KEY_TOTAL_SAMPLES, KEY_UNIT,
    PercentileValue, StatisticsSummary, SummaryRecord, SummaryValue,
};
use crate::util::write_atomic;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary path that accompanies a CDF file: `combined.csv` becomes
/// `combined.summary.txt`.
#[must_use]
pub fn summary_path_for(cdf_path: &Path) -> PathBuf {
    cdf_path.with_extension("summary.txt")
}

/// Render a summary in the fixed key order.
#[must_use]
pub fn format_summary(summary: &StatisticsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{KEY_TOTAL_SAMPLES}: {}", summary.total_samples);
    let _ = writeln!(out, "{KEY_UNIT}: {}", summary.unit);
    let _ = writeln!(out, "{KEY_MEAN}: {:.4}", summary.mean);
    let _ = writeln!(out, "{KEY_STDDEV}: {:.4}", summary.stddev);
    let _ = writeln!(out, "{KEY_MIN}: {:.4}", summary.min);
    let _ = writeln!(out, "{KEY_MAX}: {:.4}", summary.max);
    for p in &summary.percentiles {
        let _ = writeln!(out, "{}: {:.4}", p.label(), p.value);
    }
    if let Some(rate) = summary.deadline_miss_rate {
        let _ = writeln!(out, "{KEY_MISS_RATE}: {rate:.4}%");
    }
    out
}

/// Write a summary file atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_summary(path: &Path, summary: &StatisticsSummary) -> Result<()> {
    write_atomic(path, format_summary(summary).as_bytes())
}

/// Parse summary text into an ordered record.
///
/// Lines without a `:` are ignored. Values that parse as numbers (after
/// stripping trailing `%`) become numbers, everything else stays text.
#[must_use]
pub fn parse_summary(text: &str) -> SummaryRecord {
    let mut record = SummaryRecord::new();
    for line in text.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        let parsed = value
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_or_else(|_| SummaryValue::Text(value.to_string()), SummaryValue::Number);
        record.insert(key.trim(), parsed);
    }
    record
}

/// Load a summary file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_summary(path: &Path) -> Result<SummaryRecord> {
    let text = fs::read_to_string(path)
        .map_err(|e| TailbenchError::with_context(format!("reading {}", path.display()), e))?;
    Ok(parse_summary(&text))
}

/// Rebuild typed statistics from a record written by [`format_summary`].
///
/// # Errors
///
/// Returns `SummaryParse` if a required key is missing or not numeric.
pub fn to_statistics(record: &SummaryRecord, path: &Path) -> Result<StatisticsSummary> {
    let missing = |key: &str| TailbenchError::SummaryParse {
        path: path.to_path_buf(),
        line: 0,
        reason: format!("missing or non-numeric '{key}'"),
    };
    let number = |key: &str| record.number(key).ok_or_else(|| missing(key));

    let unit = record.unit().ok_or_else(|| missing(KEY_UNIT))?;
    let total = number(KEY_TOTAL_SAMPLES)?;

    let percentiles = record
        .iter()
        .filter_map(|(key, value)| {
            let level = key.strip_prefix('P')?.parse::<f64>().ok()?;
            Some(PercentileValue {
                level,
                value: value.as_f64()?,
            })
        })
        .collect();

    Ok(StatisticsSummary {
        total_samples: total as usize,
        unit,
        mean: number(KEY_MEAN)?,
        stddev: number(KEY_STDDEV)?,
        min: number(KEY_MIN)?,
        max: number(KEY_MAX)?,
        percentiles,
        deadline_miss_rate: record.deadline_miss_rate(),
    })
}
