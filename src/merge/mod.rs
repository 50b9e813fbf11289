//! Dataset merging.
//!
//! Concatenates the samples of every input file of one experiment into a
//! single dataset. Files that yield nothing (empty, malformed, unsupported or
//! unreadable) are logged and skipped; only an experiment where no file
//! contributes anything is an error.

use crate::error::{Result, TailbenchError};
use crate::ingest::{self, FormatKind, ParsedFile, ParserConfig};
use crate::stats;
use crate::util::progress::ProgressTracker;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Anything that can turn a path into latency samples.
pub trait SampleSource {
    /// Load the samples of one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn load(&self, path: &Path) -> Result<ParsedFile>;
}

/// File-backed source using the format-detecting parser.
#[derive(Debug, Clone, Default)]
pub struct FileParser {
    config: ParserConfig,
}

impl FileParser {
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl SampleSource for FileParser {
    fn load(&self, path: &Path) -> Result<ParsedFile> {
        ingest::parse_file(path, &self.config)
    }
}

/// Per-file outcome, kept for progress reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatKind>,
    pub samples: usize,
    pub skipped_lines: usize,
    /// Median of this file's samples in the file-native unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Set when the file could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    #[must_use]
    pub fn contributed(&self) -> bool {
        self.samples > 0
    }
}

/// One experiment's merged samples.
#[derive(Debug, Clone)]
pub struct MergedDataset {
    samples: Vec<f64>,
    files: Vec<FileReport>,
}

impl MergedDataset {
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Take ownership of the samples, dropping the per-file reports.
    #[must_use]
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    #[must_use]
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total malformed lines across all files.
    #[must_use]
    pub fn skipped_lines(&self) -> usize {
        self.files.iter().map(|f| f.skipped_lines).sum()
    }
}

/// Merge the samples of `paths`, the expansion of `pattern`, using `source`.
///
/// # Errors
///
/// - `NoInputFiles` naming `pattern` if `paths` is empty
/// - `NoParsedSamples` if no file yielded a sample
pub fn merge_files<S: SampleSource + ?Sized>(
    pattern: &str,
    paths: &[PathBuf],
    source: &S,
    progress: &ProgressTracker,
) -> Result<MergedDataset> {
    if paths.is_empty() {
        return Err(TailbenchError::NoInputFiles {
            pattern: pattern.to_string(),
        });
    }

    info!(pattern, files = paths.len(), "Merging latency files");

    let mut samples = Vec::new();
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        progress.set_message(&path.display().to_string());
        let report = match source.load(path) {
            Ok(parsed) => {
                let median = stats::median(&parsed.samples);
                if let Some(median) = median {
                    info!(
                        path = %path.display(),
                        samples = parsed.samples.len(),
                        median,
                        "Loaded latency file"
                    );
                } else {
                    warn!(path = %path.display(), format = parsed.format.as_str(), "File yielded no samples");
                }
                let report = FileReport {
                    path: path.clone(),
                    format: Some(parsed.format),
                    samples: parsed.samples.len(),
                    skipped_lines: parsed.skipped_lines,
                    median,
                    error: None,
                };
                samples.extend(parsed.samples);
                report
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping unreadable file");
                FileReport {
                    path: path.clone(),
                    format: None,
                    samples: 0,
                    skipped_lines: 0,
                    median: None,
                    error: Some(err.to_string()),
                }
            }
        };
        files.push(report);
        progress.inc(1);
    }

    if samples.is_empty() {
        return Err(TailbenchError::NoParsedSamples { files: paths.len() });
    }

    info!(total = samples.len(), "Merged dataset");
    Ok(MergedDataset { samples, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemorySource(HashMap<PathBuf, Vec<f64>>);

    impl SampleSource for MemorySource {
        fn load(&self, path: &Path) -> Result<ParsedFile> {
            self.0.get(path).map_or_else(
                || {
                    Err(TailbenchError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "missing",
                    )))
                },
                |samples| {
                    Ok(ParsedFile {
                        format: FormatKind::RawTabular,
                        samples: samples.clone(),
                        skipped_lines: 0,
                    })
                },
            )
        }
    }

    fn source(files: &[(&str, Vec<f64>)]) -> MemorySource {
        MemorySource(
            files
                .iter()
                .map(|(name, samples)| (PathBuf::from(name), samples.clone()))
                .collect(),
        )
    }

    #[test]
    fn concatenates_in_path_order() {
        let src = source(&[("a", vec![1.0, 2.0]), ("b", vec![3.0])]);
        let merged = merge_files(
            "*",
            &[PathBuf::from("a"), PathBuf::from("b")],
            &src,
            &ProgressTracker::hidden(),
        )
        .unwrap();
        assert_eq!(merged.samples(), &[1.0, 2.0, 3.0]);
        assert_eq!(merged.files().len(), 2);
        assert_eq!(merged.files()[0].median, Some(1.5));
    }

    #[test]
    fn empty_and_unreadable_files_are_skipped() {
        let src = source(&[("empty", vec![]), ("good", vec![5.0])]);
        let merged = merge_files(
            "*",
            &[
                PathBuf::from("empty"),
                PathBuf::from("missing"),
                PathBuf::from("good"),
            ],
            &src,
            &ProgressTracker::hidden(),
        )
        .unwrap();
        assert_eq!(merged.len(), 1);
        assert!(!merged.files()[0].contributed());
        assert!(merged.files()[1].error.is_some());
        assert!(merged.files()[2].contributed());
    }

    #[test]
    fn no_paths_is_no_input_files() {
        let src = source(&[]);
        let err = merge_files("runs/*.hdr", &[], &src, &ProgressTracker::hidden()).unwrap_err();
        assert!(matches!(&err, TailbenchError::NoInputFiles { pattern } if pattern == "runs/*.hdr"));
        assert_eq!(err.to_string(), "No files found matching: runs/*.hdr");
    }

    #[test]
    fn all_empty_is_no_parsed_samples() {
        let src = source(&[("a", vec![]), ("b", vec![])]);
        let err = merge_files(
            "*",
            &[PathBuf::from("a"), PathBuf::from("b")],
            &src,
            &ProgressTracker::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, TailbenchError::NoParsedSamples { files: 2 }));
    }
}
