//! Simulated archival backend.
//!
//! Stands in for the records repository and the compliance ledger. Both
//! steps are simulated with configurable latency and fabricated
//! identifiers; only the returned receipt is recorded on the document's
//! behalf.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// What gets written to the compliance ledger for one archived document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    pub document_id: Uuid,
    pub file_name: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub user: String,
    pub metadata: ArchiveMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMetadata {
    pub title: String,
    pub author: String,
    pub keywords: Vec<String>,
}

/// Proof of archival returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReceipt {
    pub repository_url: String,
    pub ledger_entry_id: String,
    /// SHA-256 of the serialized ledger record, hex encoded.
    pub record_digest: String,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Failed to serialize archive record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Client for the simulated repository + ledger pair.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    repository_delay: Duration,
    ledger_delay: Duration,
}

impl ArchiveClient {
    /// Production-shaped latency, matching a slow records repository.
    pub fn simulated() -> Self {
        ArchiveClient {
            repository_delay: Duration::from_millis(1000),
            ledger_delay: Duration::from_millis(500),
        }
    }

    /// Zero-latency client for tests.
    pub fn instant() -> Self {
        ArchiveClient {
            repository_delay: Duration::ZERO,
            ledger_delay: Duration::ZERO,
        }
    }

    /// Push the signed document to the repository, then append the
    /// ledger record. Returns a receipt with both identifiers.
    pub async fn archive(&self, record: &ArchiveRecord) -> Result<ArchiveReceipt, ArchiveError> {
        tracing::info!(
            document_id = %record.document_id,
            file_name = %record.file_name,
            "Uploading signed document to records repository"
        );
        tokio::time::sleep(self.repository_delay).await;
        let repository_url = format!(
            "https://provincial.sharepoint.com/sites/documents/signed/{}",
            record.file_name
        );

        tracing::info!(document_id = %record.document_id, "Writing compliance ledger entry");
        tokio::time::sleep(self.ledger_delay).await;
        let archived_at = Utc::now();
        let ledger_entry_id = format!("log_{}", archived_at.timestamp_millis());

        let serialized = serde_json::to_vec(record)?;
        let record_digest = hex::encode(Sha256::digest(&serialized));

        tracing::info!(
            document_id = %record.document_id,
            ledger_entry_id = %ledger_entry_id,
            "Archival complete"
        );

        Ok(ArchiveReceipt {
            repository_url,
            ledger_entry_id,
            record_digest,
            archived_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ArchiveRecord {
        ArchiveRecord {
            document_id: Uuid::new_v4(),
            file_name: "budget_signed.pdf".into(),
            signed_at: Some(Utc::now()),
            user: "cfo".into(),
            metadata: ArchiveMetadata {
                title: "Annual Budget".into(),
                author: "Treasury".into(),
                keywords: vec!["budget".into()],
            },
        }
    }

    #[tokio::test]
    async fn archive_returns_receipt_with_repository_url() {
        let client = ArchiveClient::instant();
        let receipt = client.archive(&sample_record()).await.unwrap();

        assert_eq!(
            receipt.repository_url,
            "https://provincial.sharepoint.com/sites/documents/signed/budget_signed.pdf"
        );
        assert!(receipt.ledger_entry_id.starts_with("log_"));
        assert_eq!(receipt.record_digest.len(), 64);
    }

    #[tokio::test]
    async fn digest_is_stable_for_same_record() {
        let client = ArchiveClient::instant();
        let record = sample_record();
        let a = client.archive(&record).await.unwrap();
        let b = client.archive(&record).await.unwrap();
        assert_eq!(a.record_digest, b.record_digest);
    }

    #[tokio::test]
    async fn record_serializes_camel_case() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.contains("\"documentId\""));
        assert!(json.contains("\"fileName\""));
        assert!(json.contains("\"signedAt\""));
    }
}
