//! Workspace umbrella crate for FindItBack.
//!
//! Re-exports the matcher and report store so callers can depend on a single
//! crate, and owns the YAML matcher configuration format ([`config`]).
//!
//! ```
//! use finditback::{Category, FinditbackConfig, FoundReport, LostReport, parse_event_date};
//!
//! let matcher = FinditbackConfig::default().build_matcher().unwrap();
//! let lost = LostReport {
//!     category: Category::Wallet,
//!     title: "Brown leather wallet".into(),
//!     description: String::new(),
//!     location: "Cafeteria".into(),
//!     lost_on: parse_event_date("2024-05-01"),
//!     status: Default::default(),
//! };
//! let found = FoundReport {
//!     category: Category::Wallet,
//!     title: "leather wallet".into(),
//!     description: String::new(),
//!     location: "cafeteria".into(),
//!     found_on: parse_event_date("2024-05-01"),
//!     status: Default::default(),
//!     returned: false,
//! };
//! assert!(matcher.match_score(&lost, &found).score >= 80);
//! ```

pub mod config;

pub use config::{ConfigLoadError, FinditbackConfig, MatcherYamlConfig, WeightsYamlConfig};
pub use matcher::{
    Breakdown, Category, Component, FoundReport, FoundStatus, LostReport, LostStatus,
    MatchConfig, MatchError, MatchMetrics, MatchOperation, MatchResult, MatchScore,
    MatchWeights, MatchableReport, Matcher, PairResult, Report, ReportKind, date_proximity,
    location_similarity, match_against_pool, match_all_pairs, match_score, parse_event_date,
    text_similarity,
};
pub use store::{InMemoryStore, ReportDocument, ReportFilter, ReportStore, StoreError, Stored};
