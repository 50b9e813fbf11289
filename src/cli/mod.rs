//! CLI definitions and entry point.

use crate::config::CliOverrides;
use crate::model::Unit;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Latency aggregation and tail-percentile analysis for scheduler experiments
#[derive(Parser, Debug)]
#[command(name = "tailbench", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./tailbench.yaml)
    #[arg(long, global = true, env = "TAILBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge one experiment's latency files into a CDF and summary
    Merge(MergeArgs),

    /// Build the cross-experiment comparison report
    Report(ReportArgs),

    /// Merge every experiment under a results directory, then report
    Run(RunArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

/// Analysis settings shared by `merge` and `run`.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Output latency unit (ns, us, ms)
    #[arg(long)]
    pub unit: Option<Unit>,

    /// Deadline in the output unit; adds the miss-rate line to the summary
    #[arg(long)]
    pub deadline: Option<f64>,

    /// Number of CDF steps
    #[arg(long)]
    pub cdf_points: Option<usize>,

    /// Maximum repeated values taken from one histogram line
    #[arg(long)]
    pub downsample_cap: Option<usize>,

    /// Percentile level to report (repeatable or comma-separated)
    #[arg(long = "percentile", short = 'p', value_delimiter = ',')]
    pub percentiles: Vec<f64>,
}

impl AnalysisArgs {
    #[must_use]
    pub fn overrides(&self, results_dir: Option<PathBuf>) -> CliOverrides {
        CliOverrides {
            unit: self.unit,
            cdf_points: self.cdf_points,
            downsample_cap: self.downsample_cap,
            deadline: self.deadline,
            percentiles: (!self.percentiles.is_empty()).then(|| self.percentiles.clone()),
            results_dir,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Glob pattern for input files (quote it)
    #[arg(long, short = 'i')]
    pub inputs: String,

    /// Output CDF path; the summary is written next to it
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Directory containing the experiment directories
    #[arg(long, visible_alias = "results_dir")]
    pub results_dir: Option<PathBuf>,

    /// Output path for the text report (a .pdf path is written as .txt)
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory containing the experiment directories
    #[arg(long, visible_alias = "results_dir")]
    pub results_dir: Option<PathBuf>,

    /// Output path for the text report (default: <results-dir>/report.txt)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn merge_parses_repeated_and_listed_percentiles() {
        let cli = Cli::parse_from([
            "tailbench",
            "merge",
            "--inputs",
            "data/*.hdr",
            "--output",
            "out.csv",
            "--unit",
            "ms",
            "-p",
            "50,99",
            "-p",
            "99.9",
        ]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.analysis.unit, Some(Unit::Ms));
        assert_eq!(args.analysis.percentiles, vec![50.0, 99.0, 99.9]);

        let overrides = args.analysis.overrides(None);
        assert_eq!(overrides.percentiles, Some(vec![50.0, 99.0, 99.9]));
        assert!(overrides.results_dir.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "tailbench",
            "report",
            "--results-dir",
            "results",
            "-o",
            "report.txt",
            "--json",
            "-vv",
        ]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn invalid_unit_rejected() {
        let err = Cli::try_parse_from([
            "tailbench", "merge", "--inputs", "x", "--output", "y", "--unit", "s",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
