//! Prompt templates for metadata extraction and the fleet compliance report.

use crate::datauri::DataUri;
use crate::models::Document;

/// System prompt for metadata extraction.
pub const EXTRACTION_SYSTEM: &str = "You are an expert document analyst for a government \
records office. You extract key metadata from documents and respond only in the \
requested format.";

/// System prompt for the fleet compliance report.
pub const REPORT_SYSTEM: &str = "You are an expert compliance officer for a government \
entity. You write concise, well-structured Markdown reports.";

/// Cap on document text included in the extraction prompt. Keeps the
/// context window bounded for large uploads.
const MAX_EXCERPT_BYTES: usize = 8 * 1024;

/// Build the metadata extraction prompt for one document.
///
/// Includes a lossy-UTF-8 excerpt of the payload: full content for TXT,
/// whatever text fragments a PDF/DOCX byte stream carries otherwise. The
/// model is asked for a single fenced JSON object.
pub fn metadata_extraction(file_name: &str, payload: &DataUri) -> String {
    let excerpt = excerpt_of(payload.bytes());
    format!(
        "Extract the following metadata from the provided document:\n\
         \n\
         - title: The title of the document.\n\
         - author: The author of the document.\n\
         - date_created: The date the document was created.\n\
         - keywords: Keywords associated with the document.\n\
         - summary: A short summary of the document.\n\
         \n\
         Respond with exactly one ```json block containing an object with \
         those five fields (keywords is an array of strings). Use an empty \
         string for anything you cannot determine.\n\
         \n\
         File name: {file_name}\n\
         Content type: {}\n\
         Document content:\n\
         ---\n\
         {excerpt}\n\
         ---",
        payload.mime(),
    )
}

/// Build the fleet compliance report prompt over all documents.
pub fn fleet_report(documents: &[Document]) -> String {
    let mut listing = String::new();
    for doc in documents {
        listing.push_str(&format!(
            "- **{}** ({}):\n    - Author: {}\n    - Created: {}\n    - Summary: {}\n    \
             - Status: {} ({})\n    - Signed: {}\n",
            doc.title,
            doc.file_name,
            doc.author,
            doc.date_created,
            doc.summary,
            doc.status,
            doc.report,
            if doc.is_signed { "Yes" } else { "No" },
        ));
    }
    format!(
        "Generate a high-level compliance report based on the provided list of \
         documents. The report must be in Markdown format and include:\n\
         - A summary of the overall compliance status.\n\
         - A section on PFMA (Public Finance Management Act) compliance, \
         highlighting any potential issues based on document metadata \
         (e.g., unsigned documents, missing summaries).\n\
         - A table summarizing the compliance status of each document.\n\
         \n\
         Here is the list of documents:\n{listing}"
    )
}

fn excerpt_of(bytes: &[u8]) -> String {
    let end = bytes.len().min(MAX_EXCERPT_BYTES);
    String::from_utf8_lossy(&bytes[..end])
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}
