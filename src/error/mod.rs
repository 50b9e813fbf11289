//! Error types and handling for `tailbench`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps `anyhow` errors for ad-hoc context
//! - Dataset-level errors (`NoInputFiles`, `NoParsedSamples`) are fatal for
//!   one experiment only; the run boundary decides whether to continue
//! - Malformed input lines are never errors; the parser counts and skips them

mod structured;

pub use structured::{ErrorCode, StructuredError};

use crate::model::Experiment;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `tailbench` operations.
#[derive(Error, Debug)]
pub enum TailbenchError {
    // === Dataset Errors ===
    /// The input pattern resolved to zero paths.
    #[error("No files found matching: {pattern}")]
    NoInputFiles { pattern: String },

    /// Every matched file parsed to zero latency values.
    #[error("No latency data found in {files} file(s)")]
    NoParsedSamples { files: usize },

    /// Statistics or CDF requested on an empty sample set.
    #[error("Cannot compute {operation} on an empty dataset")]
    EmptyDataset { operation: &'static str },

    /// A comparison needs an experiment whose summary was never produced.
    #[error("Missing summary for experiment '{experiment}'")]
    MissingExperiment { experiment: Experiment },

    // === Input Errors ===
    /// Glob pattern could not be compiled.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Unknown latency unit.
    #[error("Invalid unit: {unit}")]
    InvalidUnit { unit: String },

    /// Percentile level outside [0, 100].
    #[error("Invalid percentile level: {level}")]
    InvalidPercentile { level: String },

    /// CDF resolution must be at least one step.
    #[error("CDF point count must be positive, got {points}")]
    InvalidCdfPoints { points: usize },

    // === Artifact Errors ===
    /// A summary artifact could not be interpreted.
    #[error("Summary parse error in '{}' at line {line}: {reason}", .path.display())]
    SummaryParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A CDF artifact could not be interpreted.
    #[error("CDF parse error in '{}' at line {line}: {reason}", .path.display())]
    CdfParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TailbenchError {
    /// Does this error only invalidate a single experiment?
    #[must_use]
    pub const fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles { .. } | Self::NoParsedSamples { .. } | Self::EmptyDataset { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoInputFiles { .. } => {
                Some("Check the --inputs pattern; quote it so the shell does not expand it")
            }
            Self::NoParsedSamples { .. } => {
                Some("Inputs must be HdrHistogram classic text (.hdr) or CSV latency files")
            }
            Self::InvalidUnit { .. } => Some("Valid units: ns, us, ms"),
            Self::InvalidPercentile { .. } => Some("Percentile levels must be between 0 and 100"),
            Self::InvalidCdfPoints { .. } => Some("Use --cdf-points with a value of at least 1"),
            Self::MissingExperiment { .. } => {
                Some("Run 'tailbench merge' for the experiment before reporting")
            }
            Self::InvalidPattern { .. } => Some("Supported wildcards: *, ?, **, [abc]"),
            _ => None,
        }
    }

    /// Wrap any error with a context message.
    #[must_use]
    pub fn with_context(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type using `TailbenchError`.
pub type Result<T> = std::result::Result<T, TailbenchError>;
