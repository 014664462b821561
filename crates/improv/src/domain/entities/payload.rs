//! Payload - Binary artifact content awaiting persistence

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::errors::PipelineError;

/// Generated artifact content
///
/// Image services hand back base64 text; speech services stream raw
/// bytes. Decoding is deferred to the writer so a bad payload fails
/// only itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Base64(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn encode(bytes: &[u8]) -> Self {
        Payload::Base64(STANDARD.encode(bytes))
    }

    /// Decoded bytes ready to be written
    pub fn decode(&self) -> Result<Vec<u8>, PipelineError> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Base64(text) => STANDARD
                .decode(strip_data_url(text.trim()))
                .map_err(|e| PipelineError::Decode(e.to_string())),
        }
    }
}

/// Accept `data:image/png;base64,....` as well as bare base64
fn strip_data_url(text: &str) -> &str {
    match text.split_once(";base64,") {
        Some((prefix, body)) if prefix.starts_with("data:") => body,
        _ => text,
    }
}
