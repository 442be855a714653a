//! Metadata extraction: LLM call + lenient response parsing.

use serde::{Deserialize, Serialize};

use super::ollama::LlmClient;
use super::{prompt, PipelineError};
use crate::datauri::DataUri;

/// Metadata extracted from a document. Fields are never validated beyond
/// presence; anything the model cannot determine stays empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub title: String,
    pub author: String,
    pub date_created: String,
    pub keywords: Vec<String>,
    pub summary: String,
}

/// Run the extraction prompt against the model and parse the result.
pub fn extract_metadata(
    llm: &dyn LlmClient,
    model: &str,
    file_name: &str,
    payload: &DataUri,
) -> Result<ExtractedMetadata, PipelineError> {
    let prompt = prompt::metadata_extraction(file_name, payload);
    let response = llm.generate(model, &prompt, prompt::EXTRACTION_SYSTEM)?;
    parse_metadata_response(&response)
}

/// Parse the model's response into [`ExtractedMetadata`].
///
/// Accepts a fenced ```json block or a bare JSON object. Missing fields
/// default to empty — presence is all the caller checks.
pub fn parse_metadata_response(response: &str) -> Result<ExtractedMetadata, PipelineError> {
    let json_str = extract_json_block(response)?;

    #[derive(Deserialize)]
    struct RawMetadata {
        title: Option<String>,
        author: Option<String>,
        date_created: Option<String>,
        keywords: Option<Vec<serde_json::Value>>,
        summary: Option<String>,
    }

    let raw: RawMetadata = serde_json::from_str(&json_str)
        .map_err(|e| PipelineError::MalformedResponse(format!("JSON parse: {e}")))?;

    // Keywords arrive as mixed-type arrays from smaller models; keep
    // whatever stringifies.
    let keywords = raw
        .keywords
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect();

    Ok(ExtractedMetadata {
        title: raw.title.unwrap_or_default().trim().to_string(),
        author: raw.author.unwrap_or_default().trim().to_string(),
        date_created: raw.date_created.unwrap_or_default().trim().to_string(),
        keywords,
        summary: raw.summary.unwrap_or_default().trim().to_string(),
    })
}

/// Pull the JSON object out of the response: fenced block if present,
/// otherwise the outermost braces.
fn extract_json_block(response: &str) -> Result<String, PipelineError> {
    if let Some(start) = response.find("```json") {
        let content_start = start + 7;
        let end = response[content_start..]
            .find("```")
            .ok_or_else(|| PipelineError::MalformedResponse("Unclosed JSON block".into()))?;
        return Ok(response[content_start..content_start + end].trim().to_string());
    }
    let open = response
        .find('{')
        .ok_or_else(|| PipelineError::MalformedResponse("No JSON object found".into()))?;
    let close = response
        .rfind('}')
        .ok_or_else(|| PipelineError::MalformedResponse("No JSON object found".into()))?;
    if close <= open {
        return Err(PipelineError::MalformedResponse("No JSON object found".into()));
    }
    Ok(response[open..=close].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ollama::MockLlmClient;

    const SAMPLE: &str = r#"Here is the extraction:

```json
{
  "title": "Quarterly Expenditure Report",
  "author": "Provincial Treasury",
  "date_created": "2026-07-01",
  "keywords": ["expenditure", "Q3", 2026],
  "summary": "Spending against the approved budget for the third quarter."
}
```
"#;

    #[test]
    fn parse_fenced_response() {
        let meta = parse_metadata_response(SAMPLE).unwrap();
        assert_eq!(meta.title, "Quarterly Expenditure Report");
        assert_eq!(meta.author, "Provincial Treasury");
        assert_eq!(meta.date_created, "2026-07-01");
        assert_eq!(meta.keywords, vec!["expenditure", "Q3", "2026"]);
        assert!(meta.summary.starts_with("Spending"));
    }

    #[test]
    fn parse_bare_json() {
        let meta = parse_metadata_response(
            r#"{"title":"Memo","author":"","date_created":"","keywords":[],"summary":"Short."}"#,
        )
        .unwrap();
        assert_eq!(meta.title, "Memo");
        assert!(meta.author.is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let meta = parse_metadata_response(r#"{"title":"Only a title"}"#).unwrap();
        assert_eq!(meta.title, "Only a title");
        assert!(meta.summary.is_empty());
        assert!(meta.keywords.is_empty());
    }

    #[test]
    fn non_string_keywords_are_dropped() {
        let meta =
            parse_metadata_response(r#"{"title":"T","keywords":["a", null, {"k":1}, ""]}"#).unwrap();
        assert_eq!(meta.keywords, vec!["a"]);
    }

    #[test]
    fn unclosed_fence_is_malformed() {
        let err = parse_metadata_response("```json\n{\"title\":\"x\"}").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse(_)));
    }

    #[test]
    fn prose_without_json_is_malformed() {
        let err = parse_metadata_response("I could not read this document.").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse(_)));
    }

    #[test]
    fn extract_metadata_end_to_end_with_mock() {
        let llm = MockLlmClient::new(SAMPLE);
        let uri = DataUri::parse(&DataUri::encode("text/plain", b"budget text")).unwrap();
        let meta = extract_metadata(&llm, "llama3.2", "q3.txt", &uri).unwrap();
        assert_eq!(meta.author, "Provincial Treasury");
    }
}
