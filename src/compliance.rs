//! Compliance annotation and the fleet compliance report.
//!
//! The per-document check is a presence rule over title and summary; the
//! fleet report is an LLM-generated Markdown summary over every document.

use crate::models::{ComplianceStatus, Document};
use crate::pipeline::ollama::LlmClient;
use crate::pipeline::{prompt, PipelineError};

/// Fixed report when there is nothing to summarize.
const EMPTY_FLEET_REPORT: &str =
    "## Compliance Report\n\nNo documents available to generate a report.";

/// Annotate a document's metadata with a compliance status and rationale.
pub fn check(title: &str, summary: &str) -> (ComplianceStatus, String) {
    let compliant = !title.trim().is_empty() && !summary.trim().is_empty();
    if compliant {
        (
            ComplianceStatus::Compliant,
            "Document has a title and summary.".to_string(),
        )
    } else {
        (
            ComplianceStatus::NonCompliant,
            "Document is missing a title or summary.".to_string(),
        )
    }
}

/// Generate the fleet-wide Markdown compliance report.
///
/// An empty document list short-circuits to a fixed message without
/// touching the model.
pub fn fleet_report(
    llm: &dyn LlmClient,
    model: &str,
    documents: &[Document],
) -> Result<String, PipelineError> {
    if documents.is_empty() {
        return Ok(EMPTY_FLEET_REPORT.to_string());
    }
    let prompt = prompt::fleet_report(documents);
    let report = llm.generate(model, &prompt, prompt::REPORT_SYSTEM)?;
    Ok(report.trim().to_string())
}
