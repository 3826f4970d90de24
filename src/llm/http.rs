//! HTTP plumbing shared by the vendor adapters.

use std::time::Instant;

use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ConfigError, LlmError};
use crate::llm::provider::Provider;

/// Build the HTTP client used by an adapter.
///
/// No request timeout is set here; callers wrap the whole generation.
pub(crate) fn build_client() -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .build()
        .map_err(ConfigError::HttpClient)
}

/// Send a request once and return the response body of a 2xx reply.
pub(crate) async fn send(provider: Provider, request: RequestBuilder) -> Result<String, LlmError> {
    let started = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;

    if !status.is_success() {
        let message = vendor_error_message(&body).unwrap_or_else(|| {
            format!("{provider} request failed with status {}", status.as_u16())
        });
        error!(
            %provider,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis(),
            %message,
            "LLM request returned non-success status"
        );
        return Err(LlmError::Http {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    debug!(
        %provider,
        latency_ms = started.elapsed().as_millis(),
        body_len = body.len(),
        "LLM request succeeded"
    );
    Ok(body)
}

/// Error message reported by the vendor, if the body carries one.
///
/// All three vendors use `{"error": {"message": ...}}`; a bare string
/// `error` is accepted too.
pub(crate) fn vendor_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())?
        .trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_error_message_nested() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            vendor_error_message(body).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn test_vendor_error_message_string() {
        assert_eq!(
            vendor_error_message(r#"{"error": "overloaded"}"#).as_deref(),
            Some("overloaded")
        );
    }

    #[test]
    fn test_vendor_error_message_absent() {
        assert!(vendor_error_message("<html>Bad Gateway</html>").is_none());
        assert!(vendor_error_message(r#"{"error": {"code": 500}}"#).is_none());
        assert!(vendor_error_message(r#"{"error": {"message": "  "}}"#).is_none());
    }
}
