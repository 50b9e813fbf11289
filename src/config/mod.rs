//! Configuration management for `tailbench`.
//!
//! Precedence (lowest to highest):
//! 1. Built-in defaults
//! 2. User config (`~/.config/tailbench/config.yaml`)
//! 3. Project config (`./tailbench.yaml`, or `--config <path>`)
//! 4. Environment variables (`TAILBENCH_*`)
//! 5. CLI flags

use crate::error::{Result, TailbenchError};
use crate::ingest::{DEFAULT_DOWNSAMPLE_CAP, ParserConfig};
use crate::model::{DEFAULT_CDF_POINTS, DEFAULT_PERCENTILES, Experiment, ExperimentMap, Unit};
use crate::stats::validate_levels;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "tailbench.yaml";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TAILBENCH_";
/// Default results directory.
pub const DEFAULT_RESULTS_DIR: &str = "results";
/// Default per-experiment input pattern, relative to the experiment directory.
pub const DEFAULT_INPUTS_PATTERN: &str = "client_*/*.hdr";

/// A flat configuration layer with dotted, normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs, keeping `TAILBENCH_*` names.
    #[must_use]
    pub fn from_env_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                for variant in env_key_variants(stripped) {
                    insert_key_value(&mut layer, &variant, value.clone());
                }
            }
        }
        layer
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub unit: Option<Unit>,
    pub cdf_points: Option<usize>,
    pub downsample_cap: Option<usize>,
    pub deadline: Option<f64>,
    pub percentiles: Option<Vec<f64>>,
    pub results_dir: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(unit) = self.unit {
            insert_key_value(&mut layer, "unit", unit.to_string());
        }
        if let Some(points) = self.cdf_points {
            insert_key_value(&mut layer, "cdf-points", points.to_string());
        }
        if let Some(cap) = self.downsample_cap {
            insert_key_value(&mut layer, "downsample-cap", cap.to_string());
        }
        if let Some(deadline) = self.deadline {
            insert_key_value(&mut layer, "deadline", deadline.to_string());
        }
        if let Some(levels) = self.percentiles.as_ref().filter(|l| !l.is_empty()) {
            let joined = levels
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            insert_key_value(&mut layer, "percentiles", joined);
        }
        if let Some(dir) = &self.results_dir {
            insert_key_value(&mut layer, "results-dir", dir.to_string_lossy().to_string());
        }

        layer
    }
}

/// Load project config: the explicit `--config` file, else `./tailbench.yaml`.
///
/// # Errors
///
/// Returns an error if an explicit file is missing, or a file exists but
/// cannot be read or parsed.
pub fn load_project_config(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.is_file() => Err(TailbenchError::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(Path::new(PROJECT_CONFIG_FILE)),
    }
}

/// Load user config (~/.config/tailbench/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("tailbench")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let defaults = [
        ("unit", Unit::default().to_string()),
        ("cdf-points", DEFAULT_CDF_POINTS.to_string()),
        ("downsample-cap", DEFAULT_DOWNSAMPLE_CAP.to_string()),
        ("results-dir", DEFAULT_RESULTS_DIR.to_string()),
    ];
    for (key, value) in defaults {
        insert_key_value(&mut layer, key, value);
    }
    layer
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let project = load_project_config(explicit)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, user, project, env_layer, cli_layer,
    ]))
}

/// Resolved analysis settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub unit: Unit,
    pub cdf_points: usize,
    pub percentiles: Vec<f64>,
    /// Deadline in the output unit; enables the miss-rate line.
    pub deadline: Option<f64>,
    pub results_dir: PathBuf,
    pub parser: ParserConfig,
    /// Input glob per experiment, used by `run`.
    pub inputs: ExperimentMap<String>,
}

impl AnalysisConfig {
    /// Resolve typed settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown unit, a non-numeric value, a zero CDF
    /// resolution or an out-of-range percentile level.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let unit = match layer.get("unit") {
            Some(value) => value.parse()?,
            None => Unit::default(),
        };

        let cdf_points = parse_number(layer, "cdf-points")?.unwrap_or(DEFAULT_CDF_POINTS);
        if cdf_points == 0 {
            return Err(TailbenchError::InvalidCdfPoints { points: 0 });
        }

        let percentiles = match layer.get("percentiles") {
            Some(list) => {
                let mut levels = Vec::new();
                for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let level = item.parse::<f64>().map_err(|_| {
                        TailbenchError::InvalidPercentile {
                            level: item.to_string(),
                        }
                    })?;
                    levels.push(level);
                }
                if levels.is_empty() {
                    DEFAULT_PERCENTILES.to_vec()
                } else {
                    validate_levels(&levels)?
                }
            }
            None => DEFAULT_PERCENTILES.to_vec(),
        };

        let deadline = parse_number::<f64>(layer, "deadline")?;
        if let Some(d) = deadline.filter(|d| !d.is_finite() || *d < 0.0) {
            return Err(TailbenchError::Config(format!(
                "deadline must be a non-negative number, got {d}"
            )));
        }

        let results_dir = layer
            .get("results-dir")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR), PathBuf::from);

        let mut parser = ParserConfig::default();
        if let Some(cap) = parse_number(layer, "downsample-cap")? {
            parser.downsample_cap = cap;
        }
        let text_keys: [(&str, &mut String); 4] = [
            ("delimiter", &mut parser.delimiter),
            ("comment-prefix", &mut parser.comment_prefix),
            ("histogram-header", &mut parser.histogram_header),
            ("tabular-header", &mut parser.tabular_header),
        ];
        for (key, slot) in text_keys {
            if let Some(value) = layer.get(key).filter(|v| !v.is_empty()) {
                *slot = value.to_string();
            }
        }

        let mut inputs = ExperimentMap::new();
        for experiment in Experiment::ALL {
            let key = format!("experiments.{}.inputs", experiment.dir_name());
            let pattern = layer
                .get(&key)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or_else(
                    || default_inputs_pattern(&results_dir, experiment),
                    str::to_string,
                );
            inputs.insert(experiment, pattern);
        }

        Ok(Self {
            unit,
            cdf_points,
            percentiles,
            deadline,
            results_dir,
            parser,
            inputs,
        })
    }

    /// Input glob for one experiment.
    #[must_use]
    pub fn inputs_for(&self, experiment: Experiment) -> String {
        self.inputs
            .get(experiment)
            .cloned()
            .unwrap_or_else(|| default_inputs_pattern(&self.results_dir, experiment))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let results_dir = PathBuf::from(DEFAULT_RESULTS_DIR);
        let mut inputs = ExperimentMap::new();
        for experiment in Experiment::ALL {
            inputs.insert(experiment, default_inputs_pattern(&results_dir, experiment));
        }
        Self {
            unit: Unit::default(),
            cdf_points: DEFAULT_CDF_POINTS,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            deadline: None,
            results_dir,
            parser: ParserConfig::default(),
            inputs,
        }
    }
}

/// `<results-dir>/<experiment dir>/client_*/*.hdr`
#[must_use]
pub fn default_inputs_pattern(results_dir: &Path, experiment: Experiment) -> String {
    format!(
        "{}/{}/{DEFAULT_INPUTS_PATTERN}",
        results_dir.to_string_lossy().trim_end_matches('/'),
        experiment.dir_name()
    )
}

fn parse_number<T: std::str::FromStr>(layer: &ConfigLayer, key: &str) -> Result<Option<T>> {
    layer
        .get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| {
                TailbenchError::Config(format!("'{key}' must be a number, got '{value}'"))
            })
        })
        .transpose()
}

fn insert_key_value(layer: &mut ConfigLayer, key: &str, value: String) {
    layer.values.insert(normalize_key(key), value);
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn env_key_variants(raw: &str) -> Vec<String> {
    let raw_lower = raw.to_lowercase();
    let mut variants = vec![raw_lower.clone(), raw_lower.replace('_', ".")];
    variants.extend(experiment_inputs_key(&raw_lower));
    variants
}

/// `EXPERIMENTS_<DIR>_INPUTS` or `<DIR>_INPUTS` maps to
/// `experiments.<dir>.inputs`.
fn experiment_inputs_key(raw_lower: &str) -> Option<String> {
    let dir = raw_lower.strip_suffix("_inputs")?;
    let dir = dir.strip_prefix("experiments_").unwrap_or(dir);
    Experiment::ALL
        .iter()
        .find(|experiment| experiment.dir_name() == dir)
        .map(|experiment| format!("experiments.{}.inputs", experiment.dir_name()))
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        insert_key_value(&mut layer, &key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
