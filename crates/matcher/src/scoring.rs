//! Component scorers.
//!
//! Each scorer is total: empty or absent input yields `0.0` rather than an
//! error. Tokens shorter than [`MIN_SIGNIFICANT_TOKEN_LEN`] characters never
//! count as shared evidence.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// Tokens need at least this many characters to count as shared evidence.
pub const MIN_SIGNIFICANT_TOKEN_LEN: usize = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub const LOCATION_EXACT: f64 = 1.0;
pub const LOCATION_CONTAINS: f64 = 0.7;
pub const LOCATION_SHARED_TOKEN: f64 = 0.5;

fn is_significant(token: &str) -> bool {
    token.chars().count() >= MIN_SIGNIFICANT_TOKEN_LEN
}

fn token_set(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

/// Jaccard-style overlap of two free-text fields.
///
/// The numerator counts distinct shared tokens of three or more characters;
/// the denominator is the full distinct-token union, short tokens included.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let tokens_a = token_set(&a);
    let tokens_b = token_set(&b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common = tokens_a
        .intersection(&tokens_b)
        .filter(|t| is_significant(t))
        .count();
    let union = tokens_a.union(&tokens_b).count();

    common as f64 / union as f64
}

/// Whole days between two instants, rounded up.
pub fn day_difference(d1: DateTime<Utc>, d2: DateTime<Utc>) -> i64 {
    let millis = (d1 - d2).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Linear decay over the day window.
///
/// Same day scores 1.0 and a gap of exactly `threshold_days` still earns 0.5;
/// anything beyond the window scores 0.
pub fn date_proximity(
    d1: Option<DateTime<Utc>>,
    d2: Option<DateTime<Utc>>,
    threshold_days: i64,
) -> f64 {
    let (Some(d1), Some(d2)) = (d1, d2) else {
        return 0.0;
    };
    let diff = day_difference(d1, d2);

    if threshold_days <= 0 {
        return if diff == 0 { 1.0 } else { 0.0 };
    }
    if diff > threshold_days {
        return 0.0;
    }
    1.0 - diff as f64 / (2.0 * threshold_days as f64)
}

/// Tiered location score: exact, containment, shared keyword, or nothing.
pub fn location_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return LOCATION_EXACT;
    }
    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return LOCATION_CONTAINS;
    }

    let tokens_b = token_set(&b);
    if a
        .split_whitespace()
        .any(|t| is_significant(t) && tokens_b.contains(t))
    {
        return LOCATION_SHARED_TOKEN;
    }

    0.0
}
