//! Latency input files in the layouts the benchmark clients write.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// HdrHistogram classic percentile-distribution text with one entry per
/// `(value_ns, count)`.
pub fn histogram_text(entries: &[(f64, u64)]) -> String {
    let mut text = String::from("       Value     Percentile TotalCount 1/(1-Percentile)\n\n");
    let total: u64 = entries.iter().map(|(_, c)| c).sum();
    let mut running = 0;
    for (value, count) in entries {
        running += count;
        let percentile = if total == 0 {
            0.0
        } else {
            running as f64 / total as f64
        };
        let _ = writeln!(
            text,
            "{value:12.3} {percentile:14.12} {count:10} {:14.2}",
            1.0 / (1.0 - percentile.min(0.999_999))
        );
    }
    text.push_str("#[Mean    =        0.000, StdDeviation   =        0.000]\n");
    text.push_str("#[Max     =        0.000, Total count    =            0]\n");
    text
}

/// Histogram text with one count per microsecond value.
pub fn histogram_us(values_us: &[u64]) -> String {
    let entries: Vec<(f64, u64)> = values_us
        .iter()
        .map(|v| ((*v * 1000) as f64, 1))
        .collect();
    histogram_text(&entries)
}

/// Header-only classic histogram (client produced no samples).
pub fn empty_histogram() -> String {
    histogram_text(&[])
}

/// Raw tabular dump: `request_id,latency_ns`.
pub fn latency_csv(values_ns: &[u64]) -> String {
    let mut text = String::from("request_id,latency_ns\n");
    for (i, v) in values_ns.iter().enumerate() {
        let _ = writeln!(text, "{i},{v}");
    }
    text
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, contents).expect("write fixture");
}

/// Write a per-client histogram under `<results>/<experiment>/client_<n>/`.
pub fn write_client_histogram(results: &Path, experiment: &str, client: usize, values_us: &[u64]) {
    write_file(
        &results
            .join(experiment)
            .join(format!("client_{client}"))
            .join("latency.hdr"),
        &histogram_us(values_us),
    );
}
