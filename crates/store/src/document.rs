use chrono::{DateTime, Utc};
use matcher::{
    Category, FoundReport, FoundStatus, LostReport, LostStatus, MatchableReport,
};
use serde::{Deserialize, Serialize};

/// A report as persisted: storage identity and ownership around the report body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<R> {
    pub id: String,
    /// Opaque caller identity of the user who filed the report.
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: R,
}

impl<R: MatchableReport> MatchableReport for Stored<R> {
    fn category(&self) -> Category {
        self.report.category()
    }

    fn title(&self) -> &str {
        self.report.title()
    }

    fn description(&self) -> &str {
        self.report.description()
    }

    fn location(&self) -> &str {
        self.report.location()
    }

    fn event_date(&self) -> Option<DateTime<Utc>> {
        self.report.event_date()
    }

    fn is_active(&self) -> bool {
        self.report.is_active()
    }
}

/// Query predicate for `find_*` calls. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub owner_id: Option<String>,
    pub category: Option<Category>,
    /// Only open lost reports / available, unreturned found reports.
    pub active_only: bool,
    pub lost_status: Option<LostStatus>,
    pub found_status: Option<FoundStatus>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_lost_status(mut self, status: LostStatus) -> Self {
        self.lost_status = Some(status);
        self
    }

    pub fn with_found_status(mut self, status: FoundStatus) -> Self {
        self.found_status = Some(status);
        self
    }

    pub(crate) fn matches<R: ReportDocument>(&self, doc: &Stored<R>) -> bool {
        if let Some(owner) = &self.owner_id {
            if &doc.owner_id != owner {
                return false;
            }
        }
        if let Some(category) = self.category {
            if doc.report.category() != category {
                return false;
            }
        }
        if self.active_only && !doc.report.is_active() {
            return false;
        }
        doc.report.status_matches(self)
    }
}

/// Report bodies the store knows how to hold and filter.
pub trait ReportDocument: MatchableReport + Clone + Send + Sync + 'static {
    /// Apply the kind-specific status field of `filter`.
    fn status_matches(&self, filter: &ReportFilter) -> bool;
}

impl ReportDocument for LostReport {
    fn status_matches(&self, filter: &ReportFilter) -> bool {
        filter.lost_status.is_none_or(|s| s == self.status)
    }
}

impl ReportDocument for FoundReport {
    fn status_matches(&self, filter: &ReportFilter) -> bool {
        filter.found_status.is_none_or(|s| s == self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_lost(owner: &str, category: Category, status: LostStatus) -> Stored<LostReport> {
        let now = Utc::now();
        Stored {
            id: "lost-1".into(),
            owner_id: owner.into(),
            created_at: now,
            updated_at: now,
            report: LostReport {
                category,
                title: "umbrella".into(),
                description: String::new(),
                location: "Lobby".into(),
                lost_on: None,
                status,
            },
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let doc = stored_lost("u1", Category::Other, LostStatus::Resolved);
        assert!(ReportFilter::new().matches(&doc));
    }

    #[test]
    fn filter_fields_combine() {
        let doc = stored_lost("u1", Category::Other, LostStatus::Open);
        assert!(ReportFilter::active().owned_by("u1").matches(&doc));
        assert!(!ReportFilter::new().owned_by("u2").matches(&doc));
        assert!(!ReportFilter::new().with_category(Category::Keys).matches(&doc));
        assert!(!ReportFilter::new()
            .with_lost_status(LostStatus::Resolved)
            .matches(&doc));
        // Found-side status is ignored for lost documents.
        assert!(ReportFilter::new()
            .with_found_status(FoundStatus::Claimed)
            .matches(&doc));
    }

    #[test]
    fn active_filter_excludes_resolved() {
        let doc = stored_lost("u1", Category::Other, LostStatus::Resolved);
        assert!(!ReportFilter::active().matches(&doc));
    }

    #[test]
    fn stored_report_serializes_flat() {
        let doc = stored_lost("u1", Category::Keys, LostStatus::Open);
        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["ownerId"], "u1");
        assert_eq!(value["category"], "Keys");
        assert_eq!(value["status"], "open");
        assert!(value.get("report").is_none());
    }
}
