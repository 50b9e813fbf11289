//! Comparison report rendering.
//!
//! Loads each experiment's artifacts from the results directory and renders
//! the fixed-layout text report or the JSON document consumed by chart
//! renderers.

use crate::compare::{self, ComparisonResult};
use crate::error::Result;
use crate::format::{cdf, summary};
use crate::model::{CdfCurve, Experiment, ExperimentMap, SummaryRecord, SummaryValue};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name of the merged CDF inside an experiment directory.
pub const CDF_FILE: &str = "combined_latency.csv";
/// File name of the merged summary inside an experiment directory.
pub const SUMMARY_FILE: &str = "combined_latency.summary.txt";
/// Per-worker summary, used when no merged summary exists.
pub const FALLBACK_SUMMARY_FILE: &str = "summary.txt";
/// Percentile where the tail-zoom chart starts.
pub const TAIL_ZOOM_FROM: f64 = 99.0;

const REPORT_TITLE: &str = "Malcolm-Strict Experiment Report";
const WIDE_RULE: usize = 60;
const NARROW_RULE: usize = 40;

/// Artifacts found for one experiment directory.
#[derive(Debug, Clone, Default)]
pub struct ExperimentArtifacts {
    pub directory: PathBuf,
    pub summary: Option<SummaryRecord>,
    pub cdf: Option<CdfCurve>,
}

/// Load the artifacts of every experiment whose directory exists.
///
/// Unreadable artifacts are logged and treated as absent.
#[must_use]
pub fn load_artifacts(results_dir: &Path) -> ExperimentMap<ExperimentArtifacts> {
    load_artifacts_for(results_dir, &Experiment::ALL)
}

/// Load the artifacts of `experiments` only; the others are left out of the
/// map and report as missing.
#[must_use]
pub fn load_artifacts_for(
    results_dir: &Path,
    experiments: &[Experiment],
) -> ExperimentMap<ExperimentArtifacts> {
    let mut map = ExperimentMap::new();
    for &experiment in experiments {
        let directory = results_dir.join(experiment.dir_name());
        if !directory.is_dir() {
            warn!(experiment = %experiment, path = %directory.display(), "Experiment directory not found");
            continue;
        }

        let cdf_path = directory.join(CDF_FILE);
        let cdf = cdf_path
            .is_file()
            .then(|| cdf::load_cdf(&cdf_path))
            .and_then(|loaded| {
                loaded
                    .inspect_err(|e| warn!(path = %cdf_path.display(), error = %e, "Ignoring unreadable CDF"))
                    .ok()
            });

        let summary = find_summary(&directory).and_then(|path| {
            debug!(experiment = %experiment, path = %path.display(), "Loading summary");
            summary::load_summary(&path)
                .inspect_err(|e| warn!(path = %path.display(), error = %e, "Ignoring unreadable summary"))
                .ok()
        });

        map.insert(
            experiment,
            ExperimentArtifacts {
                directory,
                summary,
                cdf,
            },
        );
    }
    map
}

/// Merged summary if present, else `summary.txt`, else the first
/// `*/summary.txt` in name order.
fn find_summary(directory: &Path) -> Option<PathBuf> {
    [SUMMARY_FILE, FALLBACK_SUMMARY_FILE]
        .iter()
        .map(|name| directory.join(name))
        .find(|path| path.is_file())
        .or_else(|| {
            WalkDir::new(directory)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok)
                .find(|entry| {
                    entry.file_type().is_file() && entry.file_name() == FALLBACK_SUMMARY_FILE
                })
                .map(walkdir::DirEntry::into_path)
        })
}

/// Summaries of the experiments that have one.
#[must_use]
pub fn summaries(artifacts: &ExperimentMap<ExperimentArtifacts>) -> ExperimentMap<SummaryRecord> {
    let mut out = ExperimentMap::new();
    for (experiment, found) in artifacts.iter() {
        if let Some(summary) = &found.summary {
            out.insert(experiment, summary.clone());
        }
    }
    out
}

/// Comparisons that can be made with the available summaries; empty when
/// baseline-1 or the proposed method is missing.
#[must_use]
pub fn comparisons(records: &ExperimentMap<SummaryRecord>) -> Vec<ComparisonResult> {
    compare::compare(records).unwrap_or_else(|err| {
        debug!(error = %err, "Skipping key findings");
        Vec::new()
    })
}

/// Render the fixed-layout text report (no trailing newline).
#[must_use]
pub fn render_text_report(artifacts: &ExperimentMap<ExperimentArtifacts>) -> String {
    let wide = "=".repeat(WIDE_RULE);
    let narrow = "-".repeat(NARROW_RULE);
    let mut lines: Vec<String> = vec![
        wide.clone(),
        REPORT_TITLE.to_string(),
        wide.clone(),
        String::new(),
    ];

    for (experiment, found) in artifacts.iter() {
        lines.push(narrow.clone());
        lines.push(experiment.title().to_string());
        lines.push(narrow.clone());
        match &found.summary {
            Some(record) => render_experiment(record, &mut lines),
            None => lines.push("  [No data available]".to_string()),
        }
        lines.push(String::new());
    }

    let records = summaries(artifacts);
    let results = comparisons(&records);
    if !results.is_empty() {
        lines.push(wide.clone());
        lines.push("Key Findings".to_string());
        lines.push(wide.clone());
        for result in &results {
            lines.push(String::new());
            lines.push(format!(
                "{} vs {}:",
                Experiment::Proposed.policy_name(),
                result.reference.policy_name()
            ));
            lines.push(format!(
                "  P99.9 Improvement: {:.1}%",
                result.tail_improvement
            ));
            lines.push(format!(
                "  Miss Rate Reduction: {:.4}%",
                result.miss_reduction
            ));
        }
        if results
            .iter()
            .any(|r| r.reference == Experiment::Baseline2)
        {
            lines.push(String::new());
            lines.push("Observation:".to_string());
            lines.push(
                "  Original Malcolm achieves low load variance (Nash equilibrium)".to_string(),
            );
            lines.push("  but still exhibits high tail latency under heavy-tailed load.".to_string());
            lines.push("  This confirms the 'Variance Trap' hypothesis.".to_string());
        }
    }

    lines.push(String::new());
    lines.push(wide);
    lines.join("\n")
}

fn render_experiment(record: &SummaryRecord, lines: &mut Vec<String>) {
    let symbol = record.unit().unwrap_or_default().symbol();
    let latency = |level: f64| {
        record
            .percentile(level)
            .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2} {symbol}"))
    };
    let total = record
        .total_samples()
        .map_or_else(|| "N/A".to_string(), |v| format!("{v}"));
    let miss = record
        .deadline_miss_rate()
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.4}%"));

    lines.push(format!("  Total Samples: {total}"));
    lines.push(format!("  P50 Latency:   {}", latency(50.0)));
    lines.push(format!("  P99 Latency:   {}", latency(99.0)));
    lines.push(format!("  P99.9 Latency: {}", latency(99.9)));
    lines.push(format!("  P99.99 Latency:{}", latency(99.99)));
    lines.push(format!("  Miss Rate:     {miss}"));
}

/// Build the JSON document handed to chart renderers: per-experiment summary,
/// full CDF and tail CDF (P99 and above), plus the comparisons.
#[must_use]
pub fn render_json_report(artifacts: &ExperimentMap<ExperimentArtifacts>) -> Value {
    let mut experiments = Map::new();
    for (experiment, found) in artifacts.iter() {
        let summary = found.summary.as_ref().map(record_to_json);
        let full = found.cdf.as_ref().map(|curve| {
            json!({
                "unit": curve.unit,
                "points": curve.points,
            })
        });
        let tail = found.cdf.as_ref().map(|curve| {
            json!({
                "unit": curve.unit,
                "points": curve.tail(TAIL_ZOOM_FROM),
            })
        });
        experiments.insert(
            experiment.as_str().to_string(),
            json!({
                "title": experiment.title(),
                "directory": found.directory.display().to_string(),
                "summary": summary,
                "cdf": full,
                "tail_cdf": tail,
            }),
        );
    }

    let missing: Vec<&str> = Experiment::ALL
        .iter()
        .filter(|exp| !artifacts.get(**exp).is_some_and(|a| a.summary.is_some()))
        .map(Experiment::as_str)
        .collect();

    json!({
        "experiments": experiments,
        "comparisons": comparisons(&summaries(artifacts)),
        "missing": missing,
    })
}

fn record_to_json(record: &SummaryRecord) -> Value {
    let mut map = Map::new();
    for (key, value) in record.iter() {
        let value = match value {
            SummaryValue::Number(v) => json!(v),
            SummaryValue::Text(s) => json!(s),
        };
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

/// Write the text report atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_text_report(path: &Path, text: &str) -> Result<()> {
    crate::util::write_atomic(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::summary::parse_summary;
    use crate::model::{CdfPoint, Unit};

    fn artifacts(summary_text: Option<&str>) -> ExperimentArtifacts {
        ExperimentArtifacts {
            directory: PathBuf::from("results"),
            summary: summary_text.map(parse_summary),
            cdf: None,
        }
    }

    const BASELINE: &str = "Total Samples: 1000\nUnit: us\nP50: 10.0\nP99: 50.0\nP99.9: 100.0\nP99.99: 150.0\nDeadline Miss Rate: 2.5%\n";
    const ALTERNATIVE: &str = "Total Samples: 900\nUnit: us\nP50: 9.0\nP99: 45.0\nP99.9: 80.0\nP99.99: 120.0\nDeadline Miss Rate: 1.0%\n";
    const PROPOSED: &str = "Total Samples: 1100\nUnit: us\nP50: 11.0\nP99: 30.0\nP99.9: 60.0\nP99.99: 70.0\nDeadline Miss Rate: 0.1%\n";

    #[test]
    fn two_experiments_render_single_comparison() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, artifacts(Some(BASELINE)));
        map.insert(Experiment::Proposed, artifacts(Some(PROPOSED)));
        let text = render_text_report(&map);

        assert!(text.contains("Malcolm-Strict vs Power-of-2:"));
        assert!(text.contains("  P99.9 Improvement: 40.0%"));
        assert!(text.contains("  Miss Rate Reduction: 2.4000%"));
        assert!(!text.contains("Malcolm-Strict vs Original Malcolm:"));
        assert!(!text.contains("Observation:"));
        assert!(!text.contains("Experiment B"));
    }

    #[test]
    fn three_experiments_render_full_report() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, artifacts(Some(BASELINE)));
        map.insert(Experiment::Baseline2, artifacts(Some(ALTERNATIVE)));
        map.insert(Experiment::Proposed, artifacts(Some(PROPOSED)));
        let text = render_text_report(&map);

        let expected_tail = "\
============================================================
Key Findings
============================================================

Malcolm-Strict vs Power-of-2:
  P99.9 Improvement: 40.0%
  Miss Rate Reduction: 2.4000%

Malcolm-Strict vs Original Malcolm:
  P99.9 Improvement: 25.0%
  Miss Rate Reduction: 0.9000%

Observation:
  Original Malcolm achieves low load variance (Nash equilibrium)
  but still exhibits high tail latency under heavy-tailed load.
  This confirms the 'Variance Trap' hypothesis.

============================================================";
        assert!(text.ends_with(expected_tail), "report was:\n{text}");
    }

    #[test]
    fn experiment_section_layout() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, artifacts(Some(BASELINE)));
        let text = render_text_report(&map);
        let expected = "\
============================================================
Malcolm-Strict Experiment Report
============================================================

----------------------------------------
Experiment A: Power-of-2 (Baseline 1)
----------------------------------------
  Total Samples: 1000
  P50 Latency:   10.00 μs
  P99 Latency:   50.00 μs
  P99.9 Latency: 100.00 μs
  P99.99 Latency:150.00 μs
  Miss Rate:     2.5000%

============================================================";
        assert_eq!(text, expected);
    }

    #[test]
    fn missing_summary_and_values_render_placeholders() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, artifacts(None));
        map.insert(Experiment::Proposed, artifacts(Some("Total Samples: 5\n")));
        let text = render_text_report(&map);
        assert!(text.contains("  [No data available]"));
        assert!(text.contains("  P99.9 Latency: N/A"));
        assert!(text.contains("  Miss Rate:     N/A"));
        assert!(!text.contains("Key Findings"));
    }

    #[test]
    fn json_report_lists_missing_experiments() {
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, artifacts(Some(BASELINE)));
        map.insert(Experiment::Proposed, artifacts(Some(PROPOSED)));
        let json = render_json_report(&map);
        assert_eq!(json["missing"], json!(["baseline-2"]));
        assert_eq!(json["comparisons"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["experiments"]["baseline-1"]["summary"]["P99.9"],
            json!(100.0)
        );
        assert!(json["experiments"]["proposed"]["tail_cdf"].is_null());
        assert!(json["experiments"]["proposed"]["cdf"].is_null());
    }

    #[test]
    fn json_report_carries_full_and_tail_cdf() {
        let curve = CdfCurve {
            unit: Unit::Us,
            points: (0..=100)
                .map(|i| CdfPoint {
                    percentile: f64::from(i),
                    latency: f64::from(i) * 2.0,
                })
                .collect(),
        };
        let mut found = artifacts(Some(BASELINE));
        found.cdf = Some(curve);
        let mut map = ExperimentMap::new();
        map.insert(Experiment::Baseline1, found);

        let json = render_json_report(&map);
        let entry = &json["experiments"]["baseline-1"];
        assert_eq!(entry["cdf"]["points"].as_array().unwrap().len(), 101);
        assert_eq!(entry["cdf"]["unit"], json!("us"));
        let tail = entry["tail_cdf"]["points"].as_array().unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0]["percentile"], json!(99.0));
    }

    #[test]
    fn selected_experiments_only_are_loaded() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        for experiment in Experiment::ALL {
            let dir = temp.path().join(experiment.dir_name());
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(SUMMARY_FILE), BASELINE).unwrap();
        }

        let map = load_artifacts_for(temp.path(), &[Experiment::Baseline1, Experiment::Proposed]);
        assert_eq!(map.len(), 2);
        assert!(!map.contains(Experiment::Baseline2));
        let text = render_text_report(&map);
        assert!(!text.contains("Malcolm-Strict vs Original Malcolm:"));
        assert_eq!(load_artifacts(temp.path()).len(), 3);
    }
}
