//! Shared HTTP helpers for the service adapters.

use std::time::Duration;

use improv::PipelineError;
use reqwest::{Response, StatusCode};

/// Classify a transport-level failure.
///
/// Timeouts are reported apart from connection problems so callers can
/// decide to re-run a long generation.
pub(crate) fn map_transport_error(
    service: &str,
    operation: &str,
    timeout: Duration,
    err: reqwest::Error,
) -> PipelineError {
    if err.is_timeout() {
        PipelineError::Timeout {
            operation: format!("{service} {operation}"),
            after: timeout,
        }
    } else if err.is_decode() {
        PipelineError::invalid_response(service, err.to_string())
    } else {
        PipelineError::unavailable(service, err.to_string())
    }
}

/// Turn a non-2xx status into `RequestRejected` with the raw body
pub(crate) async fn ensure_success(response: Response) -> Result<Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(rejected(status, body))
}

pub(crate) fn rejected(status: StatusCode, body: String) -> PipelineError {
    PipelineError::RequestRejected {
        status: status.as_u16(),
        body,
    }
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_body() {
        let err = rejected(StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"OOM\"}".into());
        match err {
            PipelineError::RequestRejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "{\"error\":\"OOM\"}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://127.0.0.1:7860/"), "http://127.0.0.1:7860");
    }
}
