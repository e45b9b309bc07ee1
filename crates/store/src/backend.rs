use async_trait::async_trait;
use chrono::Utc;
use matcher::{FoundReport, LostReport};
use tokio::sync::RwLock;

use crate::document::{ReportDocument, ReportFilter, Stored};
use crate::StoreError;

/// Result of a conditional update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<R> {
    /// The transition accepted the document; carries the stored result.
    Updated(Stored<R>),
    /// The transition declined; carries the document as it was.
    Rejected(Stored<R>),
    /// No document with that id.
    Missing,
}

/// Document-store operations the orchestration layer relies on.
///
/// Result order of `find_*` is insertion order, which the matcher's stable
/// ranking turns into its tie-break.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_lost(
        &self,
        owner_id: &str,
        report: LostReport,
    ) -> Result<Stored<LostReport>, StoreError>;
    async fn insert_found(
        &self,
        owner_id: &str,
        report: FoundReport,
    ) -> Result<Stored<FoundReport>, StoreError>;

    async fn get_lost(&self, id: &str) -> Result<Option<Stored<LostReport>>, StoreError>;
    async fn get_found(&self, id: &str) -> Result<Option<Stored<FoundReport>>, StoreError>;

    async fn find_lost(&self, filter: &ReportFilter)
        -> Result<Vec<Stored<LostReport>>, StoreError>;
    async fn find_found(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<Stored<FoundReport>>, StoreError>;

    /// Replace the report body, returning the updated document if it exists.
    async fn update_lost(
        &self,
        id: &str,
        report: LostReport,
    ) -> Result<Option<Stored<LostReport>>, StoreError>;
    async fn update_found(
        &self,
        id: &str,
        report: FoundReport,
    ) -> Result<Option<Stored<FoundReport>>, StoreError>;

    /// Read, check and rewrite a document as one atomic step.
    ///
    /// `transition` sees the current document and returns the new body, or
    /// `None` to leave it unchanged. No other write can interleave between
    /// the check and the write.
    async fn update_lost_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<LostReport>) -> Option<LostReport> + Send + Sync),
    ) -> Result<UpdateOutcome<LostReport>, StoreError>;
    async fn update_found_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<FoundReport>) -> Option<FoundReport> + Send + Sync),
    ) -> Result<UpdateOutcome<FoundReport>, StoreError>;

    /// Returns `true` if a document was removed.
    async fn delete_lost(&self, id: &str) -> Result<bool, StoreError>;
    async fn delete_found(&self, id: &str) -> Result<bool, StoreError>;
}

/// Insertion-ordered in-memory collection of one report kind.
struct Collection<R> {
    docs: RwLock<Vec<Stored<R>>>,
}

impl<R: ReportDocument> Collection<R> {
    fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    async fn insert(&self, owner_id: &str, report: R) -> Stored<R> {
        let now = Utc::now();
        let doc = Stored {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
            report,
        };
        self.docs.write().await.push(doc.clone());
        doc
    }

    async fn get(&self, id: &str) -> Option<Stored<R>> {
        self.docs.read().await.iter().find(|d| d.id == id).cloned()
    }

    async fn find(&self, filter: &ReportFilter) -> Vec<Stored<R>> {
        self.docs
            .read()
            .await
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect()
    }

    async fn update(&self, id: &str, report: R) -> Option<Stored<R>> {
        let mut docs = self.docs.write().await;
        let doc = docs.iter_mut().find(|d| d.id == id)?;
        doc.report = report;
        doc.updated_at = Utc::now();
        Some(doc.clone())
    }

    async fn update_if(
        &self,
        id: &str,
        transition: &(dyn Fn(&Stored<R>) -> Option<R> + Send + Sync),
    ) -> UpdateOutcome<R> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
            return UpdateOutcome::Missing;
        };
        match transition(doc) {
            Some(report) => {
                doc.report = report;
                doc.updated_at = Utc::now();
                UpdateOutcome::Updated(doc.clone())
            }
            None => UpdateOutcome::Rejected(doc.clone()),
        }
    }

    async fn delete(&self, id: &str) -> bool {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        docs.len() != before
    }
}

/// An in-memory store backed by two insertion-ordered `Vec`s behind `RwLock`s.
pub struct InMemoryStore {
    lost: Collection<LostReport>,
    found: Collection<FoundReport>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            lost: Collection::new(),
            found: Collection::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert_lost(
        &self,
        owner_id: &str,
        report: LostReport,
    ) -> Result<Stored<LostReport>, StoreError> {
        let doc = self.lost.insert(owner_id, report).await;
        tracing::debug!(id = %doc.id, owner = owner_id, "lost report stored");
        Ok(doc)
    }

    async fn insert_found(
        &self,
        owner_id: &str,
        report: FoundReport,
    ) -> Result<Stored<FoundReport>, StoreError> {
        let doc = self.found.insert(owner_id, report).await;
        tracing::debug!(id = %doc.id, owner = owner_id, "found report stored");
        Ok(doc)
    }

    async fn get_lost(&self, id: &str) -> Result<Option<Stored<LostReport>>, StoreError> {
        Ok(self.lost.get(id).await)
    }

    async fn get_found(&self, id: &str) -> Result<Option<Stored<FoundReport>>, StoreError> {
        Ok(self.found.get(id).await)
    }

    async fn find_lost(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<Stored<LostReport>>, StoreError> {
        Ok(self.lost.find(filter).await)
    }

    async fn find_found(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<Stored<FoundReport>>, StoreError> {
        Ok(self.found.find(filter).await)
    }

    async fn update_lost(
        &self,
        id: &str,
        report: LostReport,
    ) -> Result<Option<Stored<LostReport>>, StoreError> {
        Ok(self.lost.update(id, report).await)
    }

    async fn update_found(
        &self,
        id: &str,
        report: FoundReport,
    ) -> Result<Option<Stored<FoundReport>>, StoreError> {
        Ok(self.found.update(id, report).await)
    }

    async fn update_lost_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<LostReport>) -> Option<LostReport> + Send + Sync),
    ) -> Result<UpdateOutcome<LostReport>, StoreError> {
        Ok(self.lost.update_if(id, transition).await)
    }

    async fn update_found_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<FoundReport>) -> Option<FoundReport> + Send + Sync),
    ) -> Result<UpdateOutcome<FoundReport>, StoreError> {
        Ok(self.found.update_if(id, transition).await)
    }

    async fn delete_lost(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.lost.delete(id).await)
    }

    async fn delete_found(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.found.delete(id).await)
    }
}
