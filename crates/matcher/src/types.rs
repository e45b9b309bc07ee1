use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::BTreeMap;

/// Relative weight of each scoring component.
///
/// The category weight is awarded in full whenever categories agree; the other
/// four scale the corresponding similarity in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchWeights {
    pub category: f64,
    pub location: f64,
    pub date: f64,
    pub title: f64,
    pub description: f64,
}

impl MatchWeights {
    pub const DEFAULT: MatchWeights = MatchWeights {
        category: 0.30,
        location: 0.25,
        date: 0.20,
        title: 0.15,
        description: 0.10,
    };

    pub fn total(&self) -> f64 {
        self.category + self.location + self.date + self.title + self.description
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Matcher tuning knobs.
///
/// `MatchConfig` is cheap to copy and serde-friendly so it can be embedded in
/// higher-level configuration files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Inclusive lower bound on returned scores.
    #[serde(default = "MatchConfig::default_min_score")]
    pub min_score: u8,
    /// Day window inside which date proximity earns credit.
    #[serde(default = "MatchConfig::default_date_threshold_days")]
    pub date_threshold_days: i64,
    #[serde(default)]
    pub weights: MatchWeights,
}

impl MatchConfig {
    pub const DEFAULT_MIN_SCORE: u8 = 40;
    pub const DEFAULT_DATE_THRESHOLD_DAYS: i64 = 5;
    /// Upper bound accepted by [`validate`](Self::validate): ten years.
    pub const MAX_DATE_THRESHOLD_DAYS: i64 = 3650;

    pub(crate) fn default_min_score() -> u8 {
        Self::DEFAULT_MIN_SCORE
    }

    pub(crate) fn default_date_threshold_days() -> i64 {
        Self::DEFAULT_DATE_THRESHOLD_DAYS
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.min_score > 100 {
            return Err(MatchError::InvalidConfig(
                "min_score must be between 0 and 100".into(),
            ));
        }
        if self.date_threshold_days <= 0 {
            return Err(MatchError::InvalidConfig(
                "date_threshold_days must be greater than zero".into(),
            ));
        }
        if self.date_threshold_days > Self::MAX_DATE_THRESHOLD_DAYS {
            return Err(MatchError::InvalidConfig(format!(
                "date_threshold_days must be at most {}",
                Self::MAX_DATE_THRESHOLD_DAYS
            )));
        }

        let w = &self.weights;
        let parts = [w.category, w.location, w.date, w.title, w.description];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(MatchError::InvalidConfig(
                "weights must be finite and non-negative".into(),
            ));
        }
        if (w.total() - 1.0).abs() > 1e-6 {
            return Err(MatchError::InvalidConfig(format!(
                "weights must sum to 1.0 (got {:.4})",
                w.total()
            )));
        }

        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: Self::DEFAULT_MIN_SCORE,
            date_threshold_days: Self::DEFAULT_DATE_THRESHOLD_DAYS,
            weights: MatchWeights::DEFAULT,
        }
    }
}

/// A single scoring component, as reported in a [`Breakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Category,
    Location,
    Date,
    Title,
    Description,
}

/// Per-component point contributions on the 0–100 scale.
///
/// Each entry is rounded on its own, so entries need not add up to the final
/// score exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(BTreeMap<Component, u8>);

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, component: Component, points: u8) {
        self.0.insert(component, points);
    }

    pub fn get(&self, component: Component) -> Option<u8> {
        self.0.get(&component).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, u8)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }
}

/// Score of one lost/found pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: u8,
    pub breakdown: Breakdown,
}

impl MatchScore {
    pub(crate) fn zero() -> Self {
        Self::default()
    }
}

/// A candidate that scored at or above the threshold against a subject report.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult<'a, R> {
    pub counterpart: &'a R,
    pub score: u8,
    pub breakdown: Breakdown,
}

impl<R> PartialEq for MatchResult<'_, R> {
    /// Same counterpart object and same score.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.counterpart, other.counterpart) && self.score == other.score
    }
}

/// One cell of the lost × found cross product.
#[derive(Debug, Clone, Serialize)]
pub struct PairResult<'a, L, F> {
    pub lost: &'a L,
    pub found: &'a F,
    pub score: u8,
    pub breakdown: Breakdown,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Invalid matcher configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}
