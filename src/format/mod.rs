//! Artifact formats for `tailbench`.
//!
//! - [`summary`] - `key: value` statistics summary written next to each CDF
//! - [`cdf`] - `percentile,latency_<unit>` CSV curve
//! - [`report`] - cross-experiment text and JSON reports
//!
//! Writers go through [`crate::util::write_atomic`] so a crashed run never
//! leaves a truncated artifact behind.

pub mod cdf;
pub mod report;
pub mod summary;

pub use cdf::{format_cdf, load_cdf, write_cdf};
pub use report::{
    ExperimentArtifacts, load_artifacts, load_artifacts_for, render_json_report, render_text_report,
};
pub use summary::{
    format_summary, load_summary, parse_summary, summary_path_for, to_statistics, write_summary,
};
