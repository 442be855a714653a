//! Document intake pipeline: data URI in, assembled `Document` out.
//!
//! `ollama` holds the LLM client seam, `prompt` the templates,
//! `metadata` the response parsing, `intake` the end-to-end assembly.

pub mod intake;
pub mod metadata;
pub mod ollama;
pub mod prompt;

/// Errors from the intake pipeline and its LLM calls.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Cannot reach Ollama at {0} — is it running?")]
    OllamaConnection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Ollama returned status {status}: {body}")]
    OllamaError { status: u16, body: String },
    #[error("Failed to parse Ollama response: {0}")]
    ResponseParsing(String),
    #[error("No suitable model available in Ollama")]
    NoModelAvailable,
    #[error("Malformed model output: {0}")]
    MalformedResponse(String),
    #[error("Invalid document payload: {0}")]
    InvalidPayload(String),
    #[error("Unsupported document type '{0}' — expected PDF, DOCX, or TXT")]
    UnsupportedType(String),
    #[error("Document exceeds the {limit_mb} MB upload limit")]
    PayloadTooLarge { limit_mb: usize },
}
