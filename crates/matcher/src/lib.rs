//! # FindItBack Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` scores how likely a lost-item report and a found-item report
//! describe the same object, and ranks candidate matches. It is a pure,
//! synchronous library: no I/O, no locks, no retained state. Callers fetch
//! candidate pools from storage, then hand borrowed slices to the matcher.
//!
//! ## Scoring
//!
//! Five weighted components produce an integer score in `0..=100`:
//!
//! | Component | Weight | Signal |
//! |---|---|---|
//! | category | 0.30 | hard gate: a mismatch scores 0 with an empty breakdown |
//! | location | 0.25 | tiered: exact 1.0, containment 0.7, shared keyword 0.5 |
//! | date | 0.20 | linear decay over a 5-day window, 0.5 at the boundary |
//! | title | 0.15 | token overlap ratio |
//! | description | 0.10 | token overlap ratio |
//!
//! ## Core Types
//!
//! - [`LostReport`] / [`FoundReport`]: the two report kinds, unified behind
//!   the [`MatchableReport`] trait (and the tagged [`Report`] enum).
//! - [`MatchConfig`]: threshold, date window, and weights.
//! - [`MatchScore`]: score plus per-component [`Breakdown`].
//! - [`MatchResult`] / [`PairResult`]: ranked results borrowing the pool.
//! - [`Matcher`]: configured, shareable entry point.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{match_against_pool, Category, FoundReport, LostReport, parse_event_date};
//!
//! let lost = LostReport {
//!     category: Category::Keys,
//!     title: "Silver Keys".into(),
//!     description: "house keys on a red keychain".into(),
//!     location: "Main Library".into(),
//!     lost_on: parse_event_date("2024-03-10"),
//!     status: Default::default(),
//! };
//! let pool = vec![FoundReport {
//!     category: Category::Keys,
//!     title: "keys".into(),
//!     description: "red keychain".into(),
//!     location: "Library".into(),
//!     found_on: parse_event_date("2024-03-11"),
//!     status: Default::default(),
//!     returned: false,
//! }];
//!
//! let matches = match_against_pool(&lost, &pool, 40);
//! assert_eq!(matches.len(), 1);
//! assert!(matches[0].score >= 40);
//! ```
//!
//! ## Observability
//!
//! Attach a [`MatchMetrics`] implementation with [`Matcher::with_metrics`] to
//! record per-run latency, comparison counts and hit counts.

pub mod engine;
pub mod metrics;
pub mod report;
pub mod scoring;
pub mod types;

pub use crate::engine::{match_all_pairs, match_against_pool, match_score, Matcher};
pub use crate::metrics::{MatchMetrics, MatchOperation};
pub use crate::report::{
    parse_event_date, Category, FoundReport, FoundStatus, LostReport, LostStatus,
    MatchableReport, ParseCategoryError, Report, ReportKind,
};
pub use crate::scoring::{date_proximity, location_similarity, text_similarity};
pub use crate::types::{
    Breakdown, Component, MatchConfig, MatchError, MatchResult, MatchScore, MatchWeights,
    PairResult,
};
