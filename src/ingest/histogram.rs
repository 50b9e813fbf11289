//! HdrHistogram classic text output.
//!
//! ```text
//! # [Histogram ...]
//!        Value     Percentile TotalCount 1/(1-Percentile)
//!        1.000     0.000000          1        1.00
//! ```
//!
//! Column 1 is the latency value and column 3 the count. Each line expands to
//! `min(count, cap)` copies of the value.

use super::{ParsedFile, ParserConfig, parse_latency};

pub(super) fn parse_line(raw: &str, config: &ParserConfig, out: &mut ParsedFile) {
    let line = raw.trim();
    if line.is_empty()
        || config.is_comment(line)
        || (!config.histogram_header.is_empty() && line.starts_with(&config.histogram_header))
    {
        return;
    }

    let mut fields = line.split_whitespace();
    let (Some(value), Some(_), Some(count)) = (fields.next(), fields.next(), fields.next()) else {
        out.skipped_lines += 1;
        return;
    };

    let (Some(value), Some(count)) = (parse_latency(value), parse_count(count)) else {
        out.skipped_lines += 1;
        return;
    };

    let copies = count.min(config.downsample_cap);
    out.samples.extend(std::iter::repeat_n(value, copies));
}

/// Counts may be printed as floats (`2500.0`); truncate toward zero and clamp
/// negatives to zero.
fn parse_count(field: &str) -> Option<usize> {
    let count = field.parse::<f64>().ok().filter(|c| c.is_finite())?;
    Some(count.trunc().max(0.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FormatKind;

    fn parse(lines: &[&str], config: &ParserConfig) -> ParsedFile {
        let mut out = ParsedFile::empty(FormatKind::ClassicHistogram);
        for line in lines {
            parse_line(line, config, &mut out);
        }
        out
    }

    #[test]
    fn caps_large_counts() {
        let out = parse(&["  250.000  0.99  123456  100.00"], &ParserConfig::default());
        assert_eq!(out.samples.len(), 1000);
        assert!(out.samples.iter().all(|v| (*v - 250.0).abs() < f64::EPSILON));
    }

    #[test]
    fn respects_configured_cap() {
        let config = ParserConfig {
            downsample_cap: 5,
            ..ParserConfig::default()
        };
        let out = parse(&["7 0.5 9 2.0", "8 0.6 2 2.5"], &config);
        assert_eq!(out.samples, vec![7.0, 7.0, 7.0, 7.0, 7.0, 8.0, 8.0]);
    }

    #[test]
    fn float_counts_truncate() {
        let out = parse(&["3.5 0.1 2.9 1.1"], &ParserConfig::default());
        assert_eq!(out.samples, vec![3.5, 3.5]);
    }

    #[test]
    fn zero_and_negative_counts_add_nothing() {
        let out = parse(&["1 0 0 1", "2 0 -4 1"], &ParserConfig::default());
        assert!(out.samples.is_empty());
        assert_eq!(out.skipped_lines, 0);
    }

    #[test]
    fn skips_headers_comments_and_blank_lines() {
        let out = parse(
            &[
                "# [Histogram]",
                "       Value     Percentile TotalCount 1/(1-Percentile)",
                "",
                "   ",
                "#[Mean = 1.0]",
            ],
            &ParserConfig::default(),
        );
        assert!(out.samples.is_empty());
        assert_eq!(out.skipped_lines, 0);
    }

    #[test]
    fn counts_malformed_lines() {
        let out = parse(
            &["abc 0.1 5 1.0", "10 0.1", "10 0.1 many 1.0", "10 0.1 1 1.0"],
            &ParserConfig::default(),
        );
        assert_eq!(out.samples, vec![10.0]);
        assert_eq!(out.skipped_lines, 3);
    }
}
