//! In-memory document store.
//!
//! Documents live only for the lifetime of the process: created at
//! intake, mutated in place by share/sign actions, never deleted. The
//! store itself is lock-free; `CoreState` wraps it in an `RwLock`.

use uuid::Uuid;

use crate::models::{ComplianceStatus, Document, FilterRule, WorkflowState};

/// Errors from store lookups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document {0} not found")]
    NotFound(Uuid),
}

/// Aggregate counts for the analytics summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DocumentStats {
    pub total: usize,
    pub uploaded: usize,
    pub shared: usize,
    pub signed: usize,
    pub compliant: usize,
    pub non_compliant: usize,
}

/// Session-scoped document collection, insertion-ordered.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc: Document) {
        debug_assert!(doc.invariant_holds());
        self.documents.push(doc);
    }

    pub fn get(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Mutate a document in place. The closure's error type lets callers
    /// thread workflow errors straight through.
    pub fn update<T, E>(
        &mut self,
        id: Uuid,
        f: impl FnOnce(&mut Document) -> Result<T, E>,
    ) -> Result<Result<T, E>, StoreError> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(f(doc))
    }

    /// All documents, optionally narrowed by a filter rule.
    pub fn list(&self, filter: Option<&FilterRule>) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|d| filter.map(|f| f.matches(d)).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            total: self.documents.len(),
            uploaded: 0,
            shared: 0,
            signed: 0,
            compliant: 0,
            non_compliant: 0,
        };
        for doc in &self.documents {
            match doc.workflow_state() {
                WorkflowState::Uploaded => stats.uploaded += 1,
                WorkflowState::Shared => stats.shared += 1,
                WorkflowState::Signed => stats.signed += 1,
            }
            match doc.status {
                ComplianceStatus::Compliant => stats.compliant += 1,
                ComplianceStatus::NonCompliant => stats.non_compliant += 1,
            }
        }
        stats
    }
}
