use crate::error::{GeoframeError, Result};
use crate::models::{MatchPolicy, OpsOptions, Suffixes, ValidityMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "geoframe.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geoframe
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub left_suffix: ConfigValue<String>,
    pub right_suffix: ConfigValue<String>,
    pub match_policy: ConfigValue<MatchPolicy>,
    pub snap_tolerance: ConfigValue<f64>,
    pub spatial_index: ConfigValue<bool>,
    pub geometry_validity: ConfigValue<ValidityMode>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = OpsOptions::default();
        Self {
            left_suffix: ConfigValue::new(defaults.suffixes.left, ConfigSource::Default),
            right_suffix: ConfigValue::new(defaults.suffixes.right, ConfigSource::Default),
            match_policy: ConfigValue::new(defaults.match_policy, ConfigSource::Default),
            snap_tolerance: ConfigValue::new(defaults.snap_tolerance, ConfigSource::Default),
            spatial_index: ConfigValue::new(defaults.use_index, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeoframeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeoframeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(suffix) = file_config.left_suffix {
            self.left_suffix.update(suffix, ConfigSource::File);
        }

        if let Some(suffix) = file_config.right_suffix {
            self.right_suffix.update(suffix, ConfigSource::File);
        }

        if let Some(policy) = file_config.match_policy {
            self.match_policy.update(policy, ConfigSource::File);
        }

        if let Some(tolerance) = file_config.snap_tolerance {
            self.snap_tolerance.update(parse_tolerance(tolerance)?, ConfigSource::File);
        }

        if let Some(index) = file_config.spatial_index {
            self.spatial_index.update(index, ConfigSource::File);
        }

        if let Some(validity) = file_config.geometry_validity {
            self.geometry_validity.update(parse_validity_mode(&validity)?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the default config file if it exists
    pub fn load_default_file(self) -> Result<Self> {
        if Path::new(CONFIG_FILE_NAME).is_file() {
            self.load_from_file(CONFIG_FILE_NAME)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOFRAME_LEFT_SUFFIX
        if let Ok(suffix) = env::var("GEOFRAME_LEFT_SUFFIX") {
            self.left_suffix.update(suffix, ConfigSource::Environment);
        }

        // GEOFRAME_RIGHT_SUFFIX
        if let Ok(suffix) = env::var("GEOFRAME_RIGHT_SUFFIX") {
            self.right_suffix.update(suffix, ConfigSource::Environment);
        }

        // GEOFRAME_MATCH_POLICY
        if let Ok(policy_str) = env::var("GEOFRAME_MATCH_POLICY") {
            match parse_match_policy(&policy_str) {
                Ok(policy) => self.match_policy.update(policy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFRAME_MATCH_POLICY value '{}': expected all or first",
                    policy_str
                ),
            }
        }

        // GEOFRAME_SNAP_TOLERANCE
        if let Ok(tolerance_str) = env::var("GEOFRAME_SNAP_TOLERANCE") {
            match tolerance_str.parse::<f64>().ok().and_then(|t| parse_tolerance(t).ok()) {
                Some(tolerance) => self.snap_tolerance.update(tolerance, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid GEOFRAME_SNAP_TOLERANCE value '{}': expected a non-negative number",
                    tolerance_str
                ),
            }
        }

        // GEOFRAME_SPATIAL_INDEX
        if let Ok(index_str) = env::var("GEOFRAME_SPATIAL_INDEX") {
            match parse_bool(&index_str) {
                Some(index) => self.spatial_index.update(index, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid GEOFRAME_SPATIAL_INDEX value '{}': expected true or false",
                    index_str
                ),
            }
        }

        // GEOFRAME_GEOMETRY_VALIDITY
        if let Ok(validity_str) = env::var("GEOFRAME_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFRAME_GEOMETRY_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(suffix) = overrides.left_suffix {
            self.left_suffix.update(suffix, ConfigSource::Cli);
        }

        if let Some(suffix) = overrides.right_suffix {
            self.right_suffix.update(suffix, ConfigSource::Cli);
        }

        if let Some(policy) = overrides.match_policy {
            self.match_policy.update(policy, ConfigSource::Cli);
        }

        if let Some(tolerance) = overrides.snap_tolerance {
            self.snap_tolerance.update(tolerance, ConfigSource::Cli);
        }

        if let Some(index) = overrides.spatial_index {
            self.spatial_index.update(index, ConfigSource::Cli);
        }

        if let Some(validity) = overrides.geometry_validity {
            self.geometry_validity.update(validity, ConfigSource::Cli);
        }
    }

    /// Options consumed by the join and aggregation operations
    pub fn to_ops_options(&self) -> OpsOptions {
        OpsOptions {
            suffixes: Suffixes {
                left: self.left_suffix.value.clone(),
                right: self.right_suffix.value.clone(),
            },
            match_policy: self.match_policy.value,
            snap_tolerance: self.snap_tolerance.value,
            use_index: self.spatial_index.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "left_suffix".to_string(),
            (self.left_suffix.value.clone(), self.left_suffix.source),
        );
        map.insert(
            "right_suffix".to_string(),
            (self.right_suffix.value.clone(), self.right_suffix.source),
        );
        map.insert(
            "match_policy".to_string(),
            (self.match_policy.value.to_string(), self.match_policy.source),
        );
        map.insert(
            "snap_tolerance".to_string(),
            (self.snap_tolerance.value.to_string(), self.snap_tolerance.source),
        );
        map.insert(
            "spatial_index".to_string(),
            (self.spatial_index.value.to_string(), self.spatial_index.source),
        );
        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    left_suffix: Option<String>,
    right_suffix: Option<String>,
    match_policy: Option<MatchPolicy>,
    snap_tolerance: Option<f64>,
    spatial_index: Option<bool>,
    geometry_validity: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub left_suffix: Option<String>,
    pub right_suffix: Option<String>,
    pub match_policy: Option<MatchPolicy>,
    pub snap_tolerance: Option<f64>,
    pub spatial_index: Option<bool>,
    pub geometry_validity: Option<ValidityMode>,
}

/// Parse match policy from string
pub fn parse_match_policy(s: &str) -> Result<MatchPolicy> {
    match s.to_lowercase().as_str() {
        "all" => Ok(MatchPolicy::All),
        "first" => Ok(MatchPolicy::First),
        _ => Err(GeoframeError::ConfigInvalid {
            key: "match_policy".to_string(),
            reason: format!("Invalid match policy: {}. Use all or first", s),
        }),
    }
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(GeoframeError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}

fn parse_tolerance(tolerance: f64) -> Result<f64> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(GeoframeError::ConfigInvalid {
            key: "snap_tolerance".to_string(),
            reason: format!("Snap tolerance must be a non-negative number, got {}", tolerance),
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
