//! Shared HTTP plumbing for the REST-backed providers.

use std::time::Duration;

use agent_core::error::{AgentError, Result};
use serde::de::DeserializeOwned;

/// Build a client with a request timeout
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))
}

/// Classify a transport-level failure
pub fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

/// Send a request and decode a JSON body, mapping non-2xx statuses to errors
pub async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(|e| transport_error(&e))?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AgentError::from_status(status.as_u16(), body));
    }

    let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AgentError::Parse(format!("unexpected provider response: {e}")))
}

/// System-prompt suffix for providers without schema-constrained decoding
pub fn schema_instruction(schema: &serde_json::Value) -> String {
    format!(
        "Respond with a single JSON object only, no prose, matching this JSON schema:\n{schema}"
    )
}
