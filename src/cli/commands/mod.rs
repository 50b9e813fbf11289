//! Command implementations.

pub mod completions;
pub mod merge;
pub mod report;
pub mod run;
pub mod version;

use crate::config::{self, AnalysisConfig, CliOverrides};
use crate::error::Result;
use std::path::Path;

/// Load layered configuration and resolve typed settings.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or a value is invalid.
pub fn resolve_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<AnalysisConfig> {
    let layer = config::load_config(config_path, overrides)?;
    AnalysisConfig::from_layer(&layer)
}
