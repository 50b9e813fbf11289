//! Merge command implementation.
//!
//! Expands the input pattern, merges every matching file into one dataset,
//! and writes the CDF plus its companion summary.

use crate::cli::MergeArgs;
use crate::cli::commands::resolve_config;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::format::{summary_path_for, write_cdf, write_summary};
use crate::merge::{FileParser, FileReport, merge_files};
use crate::model::StatisticsSummary;
use crate::stats::{SortedSamples, generate_cdf};
use crate::util::expand_pattern;
use crate::util::progress::ProgressTracker;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one merge produced.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub inputs: String,
    pub cdf_path: PathBuf,
    pub summary_path: PathBuf,
    pub cdf_points: usize,
    pub skipped_lines: usize,
    pub files: Vec<FileReport>,
    pub summary: StatisticsSummary,
}

/// Execute the merge command.
///
/// # Errors
///
/// Returns an error if no input file matches, no file yields samples, or the
/// artifacts cannot be written.
pub fn execute(args: &MergeArgs, json: bool, quiet: bool, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path, &args.analysis.overrides(None))?;
    let outcome = merge_experiment(&args.inputs, &args.output, &config, !quiet && !json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !quiet {
        print_text_output(&outcome);
    }
    Ok(())
}

/// Merge the files matching `pattern` and write `<output>` and its summary.
///
/// # Errors
///
/// Returns `NoInputFiles`, `NoParsedSamples`, or an I/O error.
pub fn merge_experiment(
    pattern: &str,
    output: &Path,
    config: &AnalysisConfig,
    show_progress: bool,
) -> Result<MergeOutcome> {
    let paths = expand_pattern(pattern)?;
    let progress = ProgressTracker::new(paths.len() as u64, "Parsing", show_progress);
    let merged = merge_files(
        pattern,
        &paths,
        &FileParser::new(config.parser.clone()),
        &progress,
    );
    progress.finish_and_clear();
    let merged = merged?;

    let files = merged.files().to_vec();
    let skipped_lines = merged.skipped_lines();
    let sorted = SortedSamples::new(merged.into_samples(), config.unit)?;
    let summary = sorted.summarize(&config.percentiles, config.deadline)?;
    let curve = generate_cdf(&sorted, config.cdf_points)?;
    drop(sorted);

    let summary_path = summary_path_for(output);
    write_cdf(output, &curve)?;
    write_summary(&summary_path, &summary)?;
    info!(
        cdf = %output.display(),
        summary = %summary_path.display(),
        samples = summary.total_samples,
        "Wrote merge artifacts"
    );

    Ok(MergeOutcome {
        inputs: pattern.to_string(),
        cdf_path: output.to_path_buf(),
        summary_path,
        cdf_points: curve.len(),
        skipped_lines,
        files,
        summary,
    })
}

fn print_text_output(outcome: &MergeOutcome) {
    let unit = outcome.summary.unit;

    println!("Found {} input file(s)", outcome.files.len());
    for file in &outcome.files {
        println!("  Loading {}...", file.path.display());
        match (&file.error, file.median) {
            (Some(err), _) => println!("    -> skipped: {err}"),
            (None, Some(median)) => println!(
                "    -> {} samples, P50={:.2}{unit}",
                file.samples,
                median / unit.divisor()
            ),
            (None, None) => println!("    -> no samples"),
        }
    }
    if outcome.skipped_lines > 0 {
        println!("  Skipped {} malformed line(s)", outcome.skipped_lines);
    }

    let s = &outcome.summary;
    println!("\nTotal samples: {}", s.total_samples);
    println!("\n=== Combined Latency Statistics ({unit}) ===");
    println!("  Mean:   {:.2}", s.mean);
    println!("  Stddev: {:.2}", s.stddev);
    println!("  Min:    {:.2}", s.min);
    println!("  Max:    {:.2}", s.max);
    for p in &s.percentiles {
        println!("  {}: {:.2}", p.label(), p.value);
    }
    if let Some(rate) = s.deadline_miss_rate {
        println!("  Deadline Miss Rate: {rate:.4}%");
    }

    println!("\nCDF saved to {}", outcome.cdf_path.display());
    println!("Summary saved to {}", outcome.summary_path.display());
}
