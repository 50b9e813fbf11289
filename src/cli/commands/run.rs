//! Run command implementation.
//!
//! Merges every experiment under the results directory in turn, then builds
//! the report from the experiments merged in this run. An experiment without
//! usable inputs is skipped with its reason; the run fails only when none
//! succeeded.

use crate::cli::RunArgs;
use crate::cli::commands::merge::{MergeOutcome, merge_experiment};
use crate::cli::commands::{report, resolve_config};
use crate::config::AnalysisConfig;
use crate::error::{Result, TailbenchError};
use crate::format::report::{CDF_FILE, load_artifacts_for, render_json_report};
use crate::model::Experiment;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default report file name inside the results directory.
pub const REPORT_FILE: &str = "report.txt";

/// Outcome of merging one experiment during a run.
#[derive(Debug, Serialize)]
pub struct ExperimentRun {
    pub experiment: Experiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged: Option<MergeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the results directory is missing, no experiment could
/// be merged, or the report cannot be written.
pub fn execute(args: &RunArgs, json: bool, quiet: bool, config_path: Option<&Path>) -> Result<()> {
    let overrides = args.analysis.overrides(args.results_dir.clone());
    let config = resolve_config(config_path, &overrides)?;
    let results_dir = config.results_dir.clone();
    if !results_dir.is_dir() {
        return Err(TailbenchError::Config(format!(
            "Results directory not found: {}",
            results_dir.display()
        )));
    }

    let runs = merge_all(&config, !quiet && !json)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| results_dir.join(REPORT_FILE));
    let artifacts = load_artifacts_for(&results_dir, &merged_experiments(&runs));

    if json {
        let text_path = report::emit(&artifacts, &output, false, true)?;
        let payload = json!({
            "experiments": runs,
            "report_path": text_path.display().to_string(),
            "report": render_json_report(&artifacts),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !quiet {
        print_runs(&runs);
    }
    let text_path = report::emit(&artifacts, &output, false, quiet)?;
    if !quiet {
        println!("Text report saved to {}", text_path.display());
    }
    Ok(())
}

/// Experiments merged in this run. Artifacts of skipped experiments left on
/// disk by earlier runs are not reported.
#[must_use]
pub fn merged_experiments(runs: &[ExperimentRun]) -> Vec<Experiment> {
    runs.iter()
        .filter(|run| run.merged.is_some())
        .map(|run| run.experiment)
        .collect()
}

/// Merge each experiment, skipping those whose inputs yield no data.
///
/// # Errors
///
/// Returns the last experiment's error when every experiment was skipped, and
/// any other error (bad pattern, unwritable artifact) immediately.
pub fn merge_all(config: &AnalysisConfig, show_progress: bool) -> Result<Vec<ExperimentRun>> {
    let mut runs = Vec::with_capacity(Experiment::ALL.len());
    let mut last_error = None;

    for experiment in Experiment::ALL {
        let pattern = config.inputs_for(experiment);
        let output = cdf_output_path(&config.results_dir, experiment);
        info!(experiment = %experiment, pattern = %pattern, "Merging experiment");

        match merge_experiment(&pattern, &output, config, show_progress) {
            Ok(outcome) => runs.push(ExperimentRun {
                experiment,
                merged: Some(outcome),
                skipped: None,
            }),
            Err(err) if err.is_dataset_error() => {
                warn!(experiment = %experiment, error = %err, "Skipping experiment");
                runs.push(ExperimentRun {
                    experiment,
                    merged: None,
                    skipped: Some(err.to_string()),
                });
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    if runs.iter().all(|run| run.merged.is_none()) {
        if let Some(err) = last_error {
            return Err(err);
        }
    }
    Ok(runs)
}

/// `<results-dir>/<experiment dir>/combined_latency.csv`
#[must_use]
pub fn cdf_output_path(results_dir: &Path, experiment: Experiment) -> PathBuf {
    results_dir.join(experiment.dir_name()).join(CDF_FILE)
}

fn print_runs(runs: &[ExperimentRun]) {
    for run in runs {
        println!("{}", run.experiment.title());
        match (&run.merged, &run.skipped) {
            (Some(outcome), _) => println!(
                "  {} samples from {} file(s) -> {}",
                outcome.summary.total_samples,
                outcome.files.iter().filter(|f| f.contributed()).count(),
                outcome.cdf_path.display()
            ),
            (None, Some(reason)) => println!("  Skipped: {reason}"),
            (None, None) => {}
        }
    }
    println!();
}
