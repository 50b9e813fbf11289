//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Exit codes that keep the three dataset failures distinguishable
//! - Context for debugging

use crate::error::TailbenchError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Dataset Errors (exit codes 3-5) ===
    /// Input pattern matched nothing
    NoInputFiles,
    /// No file yielded a sample
    NoParsedSamples,
    /// Statistics requested on an empty set
    EmptyDataset,

    // === Input Errors (exit code 2) ===
    /// Bad glob pattern
    InvalidPattern,
    /// Unknown unit
    InvalidUnit,
    /// Percentile level out of range
    InvalidPercentile,
    /// CDF resolution out of range
    InvalidCdfPoints,
    /// Configuration error
    ConfigError,
    /// YAML parsing error
    YamlError,

    // === Artifact Errors (exit code 6) ===
    /// Summary artifact unreadable
    SummaryParseError,
    /// CDF artifact unreadable
    CdfParseError,

    // === Report Errors (exit code 7) ===
    /// Experiment summary missing
    MissingExperiment,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoInputFiles => "NO_INPUT_FILES",
            Self::NoParsedSamples => "NO_PARSED_SAMPLES",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InvalidUnit => "INVALID_UNIT",
            Self::InvalidPercentile => "INVALID_PERCENTILE",
            Self::InvalidCdfPoints => "INVALID_CDF_POINTS",
            Self::ConfigError => "CONFIG_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::SummaryParseError => "SUMMARY_PARSE_ERROR",
            Self::CdfParseError => "CDF_PARSE_ERROR",
            Self::MissingExperiment => "MISSING_EXPERIMENT",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Input and configuration errors
    /// - 3: No input files matched
    /// - 4: No file yielded a sample
    /// - 5: Empty dataset reached statistics
    /// - 6: Artifact parse errors
    /// - 7: Missing experiment
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NoInputFiles => 3,
            Self::NoParsedSamples => 4,
            Self::EmptyDataset => 5,
            Self::InvalidPattern
            | Self::InvalidUnit
            | Self::InvalidPercentile
            | Self::InvalidCdfPoints
            | Self::ConfigError
            | Self::YamlError => 2,
            Self::SummaryParseError | Self::CdfParseError => 6,
            Self::MissingExperiment => 7,
            Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `TailbenchError`.
    #[must_use]
    pub fn from_error(err: &TailbenchError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &TailbenchError) -> (ErrorCode, Option<Value>) {
        match err {
            TailbenchError::NoInputFiles { pattern } => (
                ErrorCode::NoInputFiles,
                Some(json!({ "pattern": pattern })),
            ),
            TailbenchError::NoParsedSamples { files } => (
                ErrorCode::NoParsedSamples,
                Some(json!({ "files": files })),
            ),
            TailbenchError::EmptyDataset { operation } => (
                ErrorCode::EmptyDataset,
                Some(json!({ "operation": operation })),
            ),
            TailbenchError::MissingExperiment { experiment } => (
                ErrorCode::MissingExperiment,
                Some(json!({ "experiment": experiment.as_str() })),
            ),
            TailbenchError::InvalidPattern { pattern, reason } => (
                ErrorCode::InvalidPattern,
                Some(json!({ "pattern": pattern, "reason": reason })),
            ),
            TailbenchError::InvalidUnit { unit } => (
                ErrorCode::InvalidUnit,
                Some(json!({ "provided": unit, "valid_values": ["ns", "us", "ms"] })),
            ),
            TailbenchError::InvalidPercentile { level } => (
                ErrorCode::InvalidPercentile,
                Some(json!({ "provided": level })),
            ),
            TailbenchError::InvalidCdfPoints { points } => (
                ErrorCode::InvalidCdfPoints,
                Some(json!({ "provided": points })),
            ),
            TailbenchError::SummaryParse { path, line, .. } => (
                ErrorCode::SummaryParseError,
                Some(json!({ "path": path.display().to_string(), "line": line })),
            ),
            TailbenchError::CdfParse { path, line, .. } => (
                ErrorCode::CdfParseError,
                Some(json!({ "path": path.display().to_string(), "line": line })),
            ),
            TailbenchError::Config(_) => (ErrorCode::ConfigError, None),
            TailbenchError::Yaml(_) => (ErrorCode::YamlError, None),
            TailbenchError::Io(_) => (ErrorCode::IoError, None),
            TailbenchError::Json(_) => (ErrorCode::JsonError, None),
            TailbenchError::WithContext { source, .. } => {
                if source.is::<std::io::Error>() {
                    (ErrorCode::IoError, None)
                } else {
                    (ErrorCode::InternalError, None)
                }
            }
            TailbenchError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
