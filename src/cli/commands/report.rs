//! Report command implementation.
//!
//! Loads the per-experiment artifacts under a results directory and renders
//! the comparison report.

use crate::cli::ReportArgs;
use crate::cli::commands::resolve_config;
use crate::config::CliOverrides;
use crate::error::{Result, TailbenchError};
use crate::format::report::{
    ExperimentArtifacts, load_artifacts, render_json_report, render_text_report, write_text_report,
};
use crate::model::ExperimentMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if the results directory does not exist or the report
/// cannot be written.
pub fn execute(args: &ReportArgs, json: bool, quiet: bool, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        results_dir: args.results_dir.clone(),
        ..CliOverrides::default()
    };
    let config = resolve_config(config_path, &overrides)?;
    let text_path = generate(&config.results_dir, &args.output, json, quiet)?;
    if !json && !quiet {
        println!("Text report saved to {}", text_path.display());
    }
    Ok(())
}

/// Load artifacts, write the text report and print it (or the JSON document).
///
/// Returns the path the text report was written to.
///
/// # Errors
///
/// Returns an error if `results_dir` is missing or the report cannot be
/// written.
pub fn generate(results_dir: &Path, output: &Path, json: bool, quiet: bool) -> Result<PathBuf> {
    if !results_dir.is_dir() {
        return Err(TailbenchError::Config(format!(
            "Results directory not found: {}",
            results_dir.display()
        )));
    }

    let artifacts = load_artifacts(results_dir);
    debug!(experiments = artifacts.len(), "Loaded experiment artifacts");
    emit(&artifacts, output, json, quiet)
}

/// Write the text report for `artifacts` and print it (or the JSON document).
///
/// # Errors
///
/// Returns an error if the report cannot be written.
pub fn emit(
    artifacts: &ExperimentMap<ExperimentArtifacts>,
    output: &Path,
    json: bool,
    quiet: bool,
) -> Result<PathBuf> {
    let text = render_text_report(artifacts);
    let text_path = text_report_path(output);
    write_text_report(&text_path, &text)?;
    info!(path = %text_path.display(), "Wrote text report");

    if json {
        println!("{}", serde_json::to_string_pretty(&render_json_report(artifacts))?);
    } else if !quiet {
        println!("{text}");
    }
    Ok(text_path)
}

/// Where the text report goes: a `.pdf` output is written as `.txt`.
#[must_use]
pub fn text_report_path(output: &Path) -> PathBuf {
    if output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        output.with_extension("txt")
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn pdf_output_becomes_txt() {
        assert_eq!(
            text_report_path(Path::new("out/report.pdf")),
            PathBuf::from("out/report.txt")
        );
        assert_eq!(
            text_report_path(Path::new("out/report.txt")),
            PathBuf::from("out/report.txt")
        );
        assert_eq!(
            text_report_path(Path::new("out/report")),
            PathBuf::from("out/report")
        );
    }

    #[test]
    fn missing_results_dir_is_config_error() {
        init_test_logging();
        let temp = TempDir::new().expect("tempdir");
        let err = generate(
            &temp.path().join("missing"),
            &temp.path().join("r.txt"),
            false,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, TailbenchError::Config(_)));
    }

    #[test]
    fn writes_report_with_fallback_summaries() {
        init_test_logging();
        let temp = TempDir::new().expect("tempdir");
        let results = temp.path();
        let po2 = results.join("exp_a_po2").join("client_0");
        fs::create_dir_all(&po2).unwrap();
        fs::write(
            po2.join("summary.txt"),
            "Total Requests: 500\nP99.9 Latency (us): 100.0\nDeadline Miss Rate: 2.5%\n",
        )
        .unwrap();
        let strict = results.join("exp_c_malcolm_strict");
        fs::create_dir_all(&strict).unwrap();
        fs::write(
            strict.join("summary.txt"),
            "Total Requests: 400\nP99.9 Latency (us): 60.0\nDeadline Miss Rate: 0.1%\n",
        )
        .unwrap();

        let path = generate(results, &results.join("report.pdf"), false, true).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("  Total Samples: 500"));
        assert!(text.contains("  P99.9 Improvement: 40.0%"));
        assert!(text.contains("  Miss Rate Reduction: 2.4000%"));
        assert!(!text.contains("Experiment B"));
    }
}
