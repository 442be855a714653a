use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ComplianceStatus, WorkflowState};

/// A document moving through the signing desk.
///
/// Created at intake, mutated in place by share/sign actions, never
/// deleted. Lives only in memory for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    /// Source bytes as a self-describing data URI. Replaced by the
    /// stamped PDF once the document is signed.
    pub document_data_uri: String,
    pub title: String,
    pub author: String,
    pub date_created: String,
    pub keywords: Vec<String>,
    pub summary: String,
    pub status: ComplianceStatus,
    pub report: String,
    pub is_signed: bool,
    pub is_shared_for_signature: bool,
    pub created_at: DateTime<Utc>,
    pub shared_at: Option<DateTime<Utc>>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Current lifecycle stage, derived from the flags.
    pub fn workflow_state(&self) -> WorkflowState {
        if self.is_signed {
            WorkflowState::Signed
        } else if self.is_shared_for_signature {
            WorkflowState::Shared
        } else {
            WorkflowState::Uploaded
        }
    }

    /// Suggested file name for download. Signed copies gain a suffix.
    pub fn download_file_name(&self) -> String {
        if !self.is_signed {
            return self.file_name.clone();
        }
        let stem = self
            .file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name);
        format!("{stem}_signed.pdf")
    }

    /// Lifecycle invariant: signed implies shared implies a non-empty
    /// data URI backing the document.
    pub fn invariant_holds(&self) -> bool {
        if self.is_signed && !self.is_shared_for_signature {
            return false;
        }
        if self.is_shared_for_signature && self.document_data_uri.is_empty() {
            return false;
        }
        !self.document_data_uri.is_empty()
    }
}
