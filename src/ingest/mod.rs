//! Latency sample ingestion.
//!
//! Turns one input file into a flat sequence of latency values. The file
//! format is resolved once per file into a [`FormatKind`]:
//!
//! - `.hlog` files are compressed HdrHistogram interval logs, which are
//!   recognised but not decoded ([`FormatKind::Unsupported`])
//! - `.hdr` files are classic HdrHistogram percentile-distribution text
//! - `.csv` files are raw tabular latency dumps
//! - anything else is sniffed from its first line
//!
//! Malformed lines are skipped and counted, never reported as errors.

mod histogram;
mod tabular;

use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Maximum number of repeated samples materialised for one histogram bucket.
pub const DEFAULT_DOWNSAMPLE_CAP: usize = 1000;

const HISTOGRAM_TEXT_EXTENSION: &str = ".hdr";
const HISTOGRAM_LOG_EXTENSION: &str = ".hlog";
const TABULAR_EXTENSION: &str = ".csv";

/// Input file format, resolved once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// HdrHistogram classic text: `Value Percentile TotalCount 1/(1-Percentile)`.
    ClassicHistogram,
    /// One latency per line, optionally prefixed by other delimited columns.
    RawTabular,
    /// Compressed interval histogram log; yields no samples.
    Unsupported,
}

impl FormatKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClassicHistogram => "classic_histogram",
            Self::RawTabular => "raw_tabular",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Parsing policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Cap on repeated entries per histogram line.
    pub downsample_cap: usize,
    /// Field delimiter for tabular files.
    pub delimiter: String,
    /// Lines starting with this are comments.
    pub comment_prefix: String,
    /// Histogram header lines start with this keyword.
    pub histogram_header: String,
    /// Tabular lines containing this keyword (case-insensitive) are headers.
    pub tabular_header: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            downsample_cap: DEFAULT_DOWNSAMPLE_CAP,
            delimiter: ",".to_string(),
            comment_prefix: "#".to_string(),
            histogram_header: "Value".to_string(),
            tabular_header: "latency".to_string(),
        }
    }
}

impl ParserConfig {
    fn is_comment(&self, line: &str) -> bool {
        !self.comment_prefix.is_empty() && line.starts_with(&self.comment_prefix)
    }
}

/// Result of parsing one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub format: FormatKind,
    pub samples: Vec<f64>,
    /// Lines that looked like data but could not be parsed.
    pub skipped_lines: usize,
}

impl ParsedFile {
    #[must_use]
    pub const fn empty(format: FormatKind) -> Self {
        Self {
            format,
            samples: Vec::new(),
            skipped_lines: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Resolve the format of `path`, reading its first line if the name does not
/// decide it.
///
/// # Errors
///
/// Returns an error if the file must be sniffed and cannot be read.
pub fn detect_format(path: &Path, config: &ParserConfig) -> Result<FormatKind> {
    if let Some(kind) = format_from_name(path) {
        return Ok(kind);
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut first = Vec::new();
    reader.read_until(b'\n', &mut first)?;
    let first_line = String::from_utf8_lossy(&first);
    Ok(format_from_first_line(first_line.trim(), config))
}

fn format_from_name(path: &Path) -> Option<FormatKind> {
    let name = path.file_name()?.to_string_lossy();
    if name.ends_with(HISTOGRAM_LOG_EXTENSION) {
        Some(FormatKind::Unsupported)
    } else if name.ends_with(HISTOGRAM_TEXT_EXTENSION) {
        Some(FormatKind::ClassicHistogram)
    } else if name.ends_with(TABULAR_EXTENSION) {
        Some(FormatKind::RawTabular)
    } else {
        None
    }
}

/// Sniff the format from the (trimmed) first line of a file.
#[must_use]
pub fn format_from_first_line(first_line: &str, config: &ParserConfig) -> FormatKind {
    if config.is_comment(first_line)
        || (!config.histogram_header.is_empty() && first_line.contains(&config.histogram_header))
    {
        FormatKind::ClassicHistogram
    } else {
        FormatKind::RawTabular
    }
}

/// Parse one file into latency samples.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParsedFile> {
    let format = detect_format(path, config)?;
    debug!(path = %path.display(), format = format.as_str(), "Parsing latency file");

    if format == FormatKind::Unsupported {
        warn!(
            path = %path.display(),
            "Compressed histogram logs are not supported; file contributes no samples"
        );
        return Ok(ParsedFile::empty(format));
    }

    let reader = BufReader::new(File::open(path)?);
    let parsed = parse_reader(reader, format, config)?;
    if parsed.skipped_lines > 0 {
        debug!(
            path = %path.display(),
            skipped = parsed.skipped_lines,
            "Skipped malformed lines"
        );
    }
    Ok(parsed)
}

/// Parse an already-open reader in a known format.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn parse_reader<R: BufRead>(
    reader: R,
    format: FormatKind,
    config: &ParserConfig,
) -> Result<ParsedFile> {
    let mut parsed = ParsedFile::empty(format);
    match format {
        FormatKind::ClassicHistogram => for_each_line(reader, |line| {
            histogram::parse_line(line, config, &mut parsed);
        })?,
        FormatKind::RawTabular => for_each_line(reader, |line| {
            tabular::parse_line(line, config, &mut parsed);
        })?,
        FormatKind::Unsupported => {}
    }
    Ok(parsed)
}

/// Parse in-memory text, sniffing the format from its first line.
#[must_use]
pub fn parse_str(text: &str, config: &ParserConfig) -> ParsedFile {
    let first_line = text.lines().next().unwrap_or("").trim();
    let format = format_from_first_line(first_line, config);
    let mut parsed = ParsedFile::empty(format);
    for line in text.lines() {
        match format {
            FormatKind::ClassicHistogram => histogram::parse_line(line, config, &mut parsed),
            FormatKind::RawTabular => tabular::parse_line(line, config, &mut parsed),
            FormatKind::Unsupported => {}
        }
    }
    parsed
}

/// Call `f` with every line of `reader`, replacing invalid UTF-8.
fn for_each_line<R: BufRead>(mut reader: R, mut f: impl FnMut(&str)) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        f(&String::from_utf8_lossy(&buf));
    }
}

/// Parse a latency value, rejecting non-finite and negative numbers.
fn parse_latency(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
