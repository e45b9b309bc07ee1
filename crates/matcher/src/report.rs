//! Report shapes consumed by the matcher.
//!
//! Lost and found reports are distinct types with their own lifecycle status,
//! unified behind the [`MatchableReport`] trait so scoring code never needs to
//! know which side it is looking at. Dates are normalized exactly once, while
//! deserializing, by [`parse_event_date`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Item category. Category equality is a hard gate for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Keys,
    Wallet,
    Bag,
    Documents,
    Clothing,
    Jewelry,
    Accessories,
    Books,
    Pets,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Electronics,
        Category::Keys,
        Category::Wallet,
        Category::Bag,
        Category::Documents,
        Category::Clothing,
        Category::Jewelry,
        Category::Accessories,
        Category::Books,
        Category::Pets,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Keys => "Keys",
            Category::Wallet => "Wallet",
            Category::Bag => "Bag",
            Category::Documents => "Documents",
            Category::Clothing => "Clothing",
            Category::Jewelry => "Jewelry",
            Category::Accessories => "Accessories",
            Category::Books => "Books",
            Category::Pets => "Pets",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Lifecycle of a lost report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LostStatus {
    #[default]
    Open,
    Resolved,
}

/// Lifecycle of a found report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoundStatus {
    #[default]
    Available,
    Claimed,
}

/// A report describing an item somebody lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostReport {
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// `None` when the submitted date was absent or could not be parsed.
    #[serde(default, deserialize_with = "lenient_date")]
    pub lost_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: LostStatus,
}

/// A report describing an item somebody found and wants to hand back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundReport {
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub found_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: FoundStatus,
    #[serde(default)]
    pub returned: bool,
}

/// Which side of the lost/found pairing a report sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Found,
}

impl ReportKind {
    pub fn opposite(self) -> ReportKind {
        match self {
            ReportKind::Lost => ReportKind::Found,
            ReportKind::Found => ReportKind::Lost,
        }
    }
}

/// Read-only view the scorers work against.
///
/// `category` must be the first field any scorer reads; everything else may be
/// empty or absent and simply contributes nothing.
pub trait MatchableReport {
    fn category(&self) -> Category;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn location(&self) -> &str;
    /// The lost-on or found-on date, whichever applies.
    fn event_date(&self) -> Option<DateTime<Utc>>;
    /// Open lost reports and available, unreturned found reports.
    fn is_active(&self) -> bool;
}

impl MatchableReport for LostReport {
    fn category(&self) -> Category {
        self.category
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        self.lost_on
    }

    fn is_active(&self) -> bool {
        self.status == LostStatus::Open
    }
}

impl MatchableReport for FoundReport {
    fn category(&self) -> Category {
        self.category
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        self.found_on
    }

    fn is_active(&self) -> bool {
        self.status == FoundStatus::Available && !self.returned
    }
}

impl<T: MatchableReport + ?Sized> MatchableReport for &T {
    fn category(&self) -> Category {
        (**self).category()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn location(&self) -> &str {
        (**self).location()
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        (**self).event_date()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Either kind of report, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    Lost(LostReport),
    Found(FoundReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Lost(_) => ReportKind::Lost,
            Report::Found(_) => ReportKind::Found,
        }
    }

    fn inner(&self) -> &dyn MatchableReport {
        match self {
            Report::Lost(r) => r,
            Report::Found(r) => r,
        }
    }
}

impl MatchableReport for Report {
    fn category(&self) -> Category {
        self.inner().category()
    }

    fn title(&self) -> &str {
        self.inner().title()
    }

    fn description(&self) -> &str {
        self.inner().description()
    }

    fn location(&self) -> &str {
        self.inner().location()
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        self.inner().event_date()
    }

    fn is_active(&self) -> bool {
        self.inner().is_active()
    }
}

/// Parse a user-supplied date into UTC.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and bare
/// `YYYY-MM-DD` (UTC midnight). Anything else yields `None`.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let parsed = raw.as_deref().and_then(parse_event_date);
    if parsed.is_none() {
        if let Some(raw) = raw.as_deref().filter(|r| !r.trim().is_empty()) {
            tracing::warn!(date = raw, "unparseable report date, treating as absent");
        }
    }
    Ok(parsed)
}
