//! # FindItBack Store (`store`)
//!
//! Async document storage for lost and found reports. The orchestration layer
//! reads candidate pools from here before handing them to the `matcher`
//! crate; the matcher itself never touches storage.
//!
//! - [`ReportStore`]: create / find / update / delete-by-filter operations,
//!   plus check-and-set updates reported as [`UpdateOutcome`].
//! - [`InMemoryStore`]: insertion-ordered backend for tests and single-node
//!   deployments.
//! - [`Stored`]: a report body plus storage id, owner and timestamps.
//! - [`ReportFilter`]: owner, category, status and active-only predicates.
//!
//! ```
//! use store::{InMemoryStore, ReportFilter, ReportStore};
//! use matcher::{Category, LostReport};
//!
//! async fn demo() -> Result<(), store::StoreError> {
//!     let store = InMemoryStore::new();
//!     let report = LostReport {
//!         category: Category::Keys,
//!         title: "Silver Keys".into(),
//!         description: String::new(),
//!         location: "Main Library".into(),
//!         lost_on: None,
//!         status: Default::default(),
//!     };
//!     store.insert_lost("user-1", report).await?;
//!     let open = store.find_lost(&ReportFilter::active()).await?;
//!     assert_eq!(open.len(), 1);
//!     Ok(())
//! }
//! ```

mod backend;
mod document;

pub use backend::{InMemoryStore, ReportStore, UpdateOutcome};
pub use document::{ReportDocument, ReportFilter, Stored};

use thiserror::Error;

/// Errors surfaced by a storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed to read or write.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}
