//! Data URI handling for document and signature payloads.
//!
//! Everything crossing the API boundary travels as
//! `data:<mime>;base64,<payload>` strings. This module parses them into
//! typed values, re-encodes binary output, and sniffs the real content
//! type from magic bytes so a mislabeled upload cannot masquerade as a PDF.

use base64::Engine;

/// Errors from data URI parsing.
#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("Missing 'data:' scheme")]
    MissingScheme,
    #[error("Missing base64 marker")]
    NotBase64,
    #[error("Base64 decode failed: {0}")]
    Decode(String),
    #[error("Empty payload")]
    EmptyPayload,
}

/// A parsed data URI: declared MIME type plus decoded bytes.
#[derive(Debug, Clone)]
pub struct DataUri {
    mime: String,
    bytes: Vec<u8>,
}

impl DataUri {
    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// Tolerates a bare base64 string with no header (treated as
    /// `application/octet-stream`); some clients strip the prefix.
    pub fn parse(input: &str) -> Result<Self, DataUriError> {
        let (mime, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let comma = rest.find(',').ok_or(DataUriError::NotBase64)?;
                let header = &rest[..comma];
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or(DataUriError::NotBase64)?;
                let mime = if mime.is_empty() {
                    "application/octet-stream"
                } else {
                    mime
                };
                (mime.to_string(), &rest[comma + 1..])
            }
            None if input.contains(':') => return Err(DataUriError::MissingScheme),
            None => ("application/octet-stream".to_string(), input),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| DataUriError::Decode(e.to_string()))?;
        if bytes.is_empty() {
            return Err(DataUriError::EmptyPayload);
        }
        Ok(Self { mime, bytes })
    }

    /// Encode bytes back into a data URI string.
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!("data:{mime};base64,{payload}")
    }

    /// The MIME type declared in the URI header.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type sniffed from magic bytes, ignoring the declared header.
    pub fn sniffed_mime(&self) -> &'static str {
        sniff_mime(&self.bytes)
    }

    /// True when the payload is a real PDF (magic bytes, not the header).
    pub fn is_pdf(&self) -> bool {
        self.sniffed_mime() == "application/pdf"
    }

    /// True when the payload is a real PNG.
    pub fn is_png(&self) -> bool {
        self.sniffed_mime() == "image/png"
    }
}

/// Detect the content type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.len() >= 5 && &bytes[0..5] == b"%PDF-" {
        "application/pdf"
    } else if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        "image/png"
    } else if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        "image/jpeg"
    } else if bytes.len() >= 4 && &bytes[0..4] == b"PK\x03\x04" {
        // DOCX and friends are zip containers.
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if std::str::from_utf8(bytes).is_ok() {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}
