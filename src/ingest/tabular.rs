//! Raw tabular latency dumps.
//!
//! Accepts `latency_ns` and `timestamp,latency_ns` layouts alike: the last
//! delimited field of each line is the latency.

use super::{ParsedFile, ParserConfig, parse_latency};

pub(super) fn parse_line(raw: &str, config: &ParserConfig, out: &mut ParsedFile) {
    let line = raw.trim();
    if line.is_empty() || config.is_comment(line) || is_header(line, config) {
        return;
    }

    let last = if config.delimiter.is_empty() {
        line
    } else {
        line.rsplit(config.delimiter.as_str()).next().unwrap_or(line)
    };

    match parse_latency(last) {
        Some(value) => out.samples.push(value),
        None => out.skipped_lines += 1,
    }
}

fn is_header(line: &str, config: &ParserConfig) -> bool {
    !config.tabular_header.is_empty()
        && line
            .to_lowercase()
            .contains(&config.tabular_header.to_lowercase())
}
