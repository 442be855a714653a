//! Document intake: validate the upload, extract metadata, annotate
//! compliance, assemble the `Document` record.

use chrono::Utc;
use uuid::Uuid;

use super::metadata::extract_metadata;
use super::ollama::LlmClient;
use super::PipelineError;
use crate::compliance;
use crate::datauri::DataUri;
use crate::models::Document;

/// Maximum upload size (10 MB).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted at intake. Only PDF is signed downstream.
const ACCEPTED_MIMES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Run the full intake pipeline on one upload.
///
/// Validation happens before any model call so malformed uploads fail
/// fast. The returned document is in the `Uploaded` state.
pub fn intake_document(
    llm: &dyn LlmClient,
    model: &str,
    file_name: &str,
    raw_data_uri: &str,
) -> Result<Document, PipelineError> {
    let payload = DataUri::parse(raw_data_uri)
        .map_err(|e| PipelineError::InvalidPayload(e.to_string()))?;

    if payload.len() > MAX_UPLOAD_BYTES {
        return Err(PipelineError::PayloadTooLarge {
            limit_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }

    let sniffed = payload.sniffed_mime();
    if !ACCEPTED_MIMES.contains(&sniffed) {
        return Err(PipelineError::UnsupportedType(sniffed.to_string()));
    }

    let meta = extract_metadata(llm, model, file_name, &payload)?;
    let (status, report) = compliance::check(&meta.title, &meta.summary);

    tracing::info!(
        file_name,
        mime = sniffed,
        title = %meta.title,
        status = %status,
        "Document intake complete"
    );

    Ok(Document {
        id: Uuid::new_v4(),
        file_name: file_name.to_string(),
        // Re-encode with the sniffed type so the stored URI is honest
        // even when the client mislabeled the upload.
        document_data_uri: DataUri::encode(sniffed, payload.bytes()),
        title: meta.title,
        author: meta.author,
        date_created: meta.date_created,
        keywords: meta.keywords,
        summary: meta.summary,
        status,
        report,
        is_signed: false,
        is_shared_for_signature: false,
        created_at: Utc::now(),
        shared_at: None,
        signed_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplianceStatus, WorkflowState};
    use crate::pipeline::ollama::MockLlmClient;

    const GOOD_EXTRACTION: &str = r#"```json
{
  "title": "Tender Award 44/2026",
  "author": "Procurement Unit",
  "date_created": "2026-03-02",
  "keywords": ["tender", "award"],
  "summary": "Award of tender 44/2026 to the preferred bidder."
}
```"#;

    fn txt_uri(content: &[u8]) -> String {
        DataUri::encode("text/plain", content)
    }

    #[test]
    fn intake_assembles_uploaded_document() {
        let llm = MockLlmClient::new(GOOD_EXTRACTION);
        let doc =
            intake_document(&llm, "llama3.2", "tender.txt", &txt_uri(b"tender text")).unwrap();

        assert_eq!(doc.title, "Tender Award 44/2026");
        assert_eq!(doc.status, ComplianceStatus::Compliant);
        assert_eq!(doc.workflow_state(), WorkflowState::Uploaded);
        assert!(!doc.is_signed);
        assert!(!doc.is_shared_for_signature);
        assert!(doc.invariant_holds());
        assert!(doc.document_data_uri.starts_with("data:text/plain;base64,"));
    }

    #[test]
    fn intake_marks_missing_summary_non_compliant() {
        let llm = MockLlmClient::new(r#"{"title":"Untitled scan","summary":""}"#);
        let doc = intake_document(&llm, "llama3.2", "scan.txt", &txt_uri(b"x")).unwrap();
        assert_eq!(doc.status, ComplianceStatus::NonCompliant);
        assert_eq!(doc.report, "Document is missing a title or summary.");
    }

    #[test]
    fn intake_rejects_invalid_data_uri() {
        let llm = MockLlmClient::new(GOOD_EXTRACTION);
        let err = intake_document(&llm, "llama3.2", "x.pdf", "data:application/pdf;base64,@@")
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
    }

    #[test]
    fn intake_rejects_unsupported_type() {
        let llm = MockLlmClient::new(GOOD_EXTRACTION);
        // JPEG magic bytes — not an accepted document type.
        let uri = DataUri::encode("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]);
        let err = intake_document(&llm, "llama3.2", "photo.jpg", &uri).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedType(_)));
    }

    #[test]
    fn intake_rejects_oversized_payload() {
        let llm = MockLlmClient::new(GOOD_EXTRACTION);
        let big = vec![b'a'; MAX_UPLOAD_BYTES + 1];
        let err = intake_document(&llm, "llama3.2", "big.txt", &txt_uri(&big)).unwrap_err();
        assert!(matches!(err, PipelineError::PayloadTooLarge { .. }));
    }

    #[test]
    fn intake_accepts_pdf_magic_bytes() {
        let llm = MockLlmClient::new(GOOD_EXTRACTION);
        let uri = DataUri::encode("application/pdf", b"%PDF-1.4 minimal");
        let doc = intake_document(&llm, "llama3.2", "doc.pdf", &uri).unwrap();
        assert!(doc.document_data_uri.starts_with("data:application/pdf"));
    }
}
