//! `tailbench` - latency aggregation and tail-percentile analysis.
//!
//! Ingests latency logs from benchmark clients (classic HdrHistogram text
//! output or raw CSV), merges them per experiment, computes percentile
//! statistics and a fixed-resolution CDF, and compares tail latency across
//! the three scheduling experiments.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod model;
pub mod stats;
pub mod util;

pub use error::{ErrorCode, Result, StructuredError, TailbenchError};
