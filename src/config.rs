//! YAML configuration file support for the FindItBack matcher.
//!
//! Deployments tune matching without a rebuild by pointing the server at a
//! YAML file (`matcher_config_path`). Omitted fields keep their defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "campus"
//!
//! matcher:
//!   min_score: 40
//!   date_threshold_days: 5
//!   weights:
//!     category: 0.30
//!     location: 0.25
//!     date: 0.20
//!     title: 0.15
//!     description: 0.10
//! ```

use std::fs;
use std::path::Path;

use matcher::{MatchConfig, MatchWeights, Matcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FinditbackConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Matcher configuration
    #[serde(default)]
    pub matcher: MatcherYamlConfig,
}

impl FinditbackConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            name = config.name.as_deref().unwrap_or("-"),
            min_score = config.matcher.min_score,
            date_threshold_days = config.matcher.date_threshold_days,
            "loaded matcher configuration"
        );
        Ok(config)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FinditbackConfig = serde_yaml::from_str(yaml)?;
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "rejected matcher configuration");
            return Err(err);
        }
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }
        self.to_match_config().map(|_| ())
    }

    /// Convert the `matcher` section into a validated [`MatchConfig`]
    pub fn to_match_config(&self) -> Result<MatchConfig, ConfigLoadError> {
        let config = self.matcher.to_match_config();
        config
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;
        Ok(config)
    }

    /// Build a [`Matcher`] from this configuration
    pub fn build_matcher(&self) -> Result<Matcher, ConfigLoadError> {
        Matcher::new(self.to_match_config()?)
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherYamlConfig {
    #[serde(default = "default_min_score")]
    pub min_score: u8,

    #[serde(default = "default_date_threshold_days")]
    pub date_threshold_days: i64,

    #[serde(default)]
    pub weights: WeightsYamlConfig,
}

impl MatcherYamlConfig {
    fn to_match_config(&self) -> MatchConfig {
        MatchConfig {
            min_score: self.min_score,
            date_threshold_days: self.date_threshold_days,
            weights: self.weights.to_match_weights(),
        }
    }
}

impl Default for MatcherYamlConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            date_threshold_days: default_date_threshold_days(),
            weights: WeightsYamlConfig::default(),
        }
    }
}

/// Component weights; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsYamlConfig {
    #[serde(default = "default_category_weight")]
    pub category: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_date_weight")]
    pub date: f64,
    #[serde(default = "default_title_weight")]
    pub title: f64,
    #[serde(default = "default_description_weight")]
    pub description: f64,
}

impl WeightsYamlConfig {
    fn to_match_weights(&self) -> MatchWeights {
        MatchWeights {
            category: self.category,
            location: self.location,
            date: self.date,
            title: self.title,
            description: self.description,
        }
    }
}

impl Default for WeightsYamlConfig {
    fn default() -> Self {
        Self {
            category: default_category_weight(),
            location: default_location_weight(),
            date: default_date_weight(),
            title: default_title_weight(),
            description: default_description_weight(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_min_score() -> u8 {
    MatchConfig::DEFAULT_MIN_SCORE
}
fn default_date_threshold_days() -> i64 {
    MatchConfig::DEFAULT_DATE_THRESHOLD_DAYS
}
fn default_category_weight() -> f64 {
    MatchWeights::DEFAULT.category
}
fn default_location_weight() -> f64 {
    MatchWeights::DEFAULT.location
}
fn default_date_weight() -> f64 {
    MatchWeights::DEFAULT.date
}
fn default_title_weight() -> f64 {
    MatchWeights::DEFAULT.title
}
fn default_description_weight() -> f64 {
    MatchWeights::DEFAULT.description
}
