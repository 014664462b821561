//! Pipeline Errors
//!
//! Error types shared by every layer of the generation pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by prompt assembly, generation and persistence
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required configuration (usually an API key) is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown character, shot, line or template key.
    #[error("Unknown {kind} '{key}'. Available: {}", format_available(.available))]
    NotFound {
        kind: String,
        key: String,
        available: Vec<String>,
    },

    /// The remote service could not be reached.
    #[error("Service unavailable ({service}): {message}")]
    ServiceUnavailable { service: String, message: String },

    /// The remote service answered with a non-success status.
    #[error("Generation rejected ({status}): {body}")]
    RequestRejected { status: u16, body: String },

    /// A request ran past its configured bound.
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    /// Some payloads of a batch were persisted before one failed.
    #[error("Wrote {} of {total} files; payload {failed_index} failed: {reason}", .written.len())]
    PartialWrite {
        written: Vec<PathBuf>,
        failed_index: usize,
        total: usize,
        reason: String,
    },

    /// The remote service answered 2xx with a body we could not use.
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

impl PipelineError {
    pub fn not_found<K, I, S>(kind: K, key: &str, available: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotFound {
            kind: kind.as_ref().to_string(),
            key: key.to_string(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Paths already on disk when the error was raised.
    pub fn written_paths(&self) -> &[PathBuf] {
        match self {
            Self::PartialWrite { written, .. } => written,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
