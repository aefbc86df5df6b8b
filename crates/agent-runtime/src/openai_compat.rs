//! OpenAI-compatible Chat Completions Provider
//!
//! Works against any `/chat/completions` endpoint (Groq, OpenAI, vLLM, ...).
//! Supports native function calling and `json_schema` response formats.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, send_json};

/// Groq's OpenAI-compatible base URL
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI-compatible provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiCompatConfig {
    /// Base URL including the version segment, e.g. `https://api.groq.com/openai/v1`
    pub base_url: String,

    /// Bearer token (optional for local servers)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.into(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Chat completions provider
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(AgentError::Config("OpenAI-compatible base URL is required".into()));
        }

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::plain("system", &m.content),
                Role::User => ChatMessage::plain("user", &m.content),
                Role::Assistant => ChatMessage {
                    role: "assistant",
                    content: (!m.content.is_empty()).then(|| m.content.clone()),
                    tool_calls: m
                        .tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: call.id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                            kind: "function".into(),
                            function: WireFunction {
                                name: call.name.clone(),
                                arguments: call.arguments_json().to_string(),
                            },
                        })
                        .collect(),
                    tool_call_id: None,
                },
                Role::Tool => ChatMessage {
                    tool_call_id: m.tool_call_id.clone(),
                    ..ChatMessage::plain("tool", &m.content)
                },
            })
            .collect()
    }

    fn build_request(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(messages),
            tools: tools
                .iter()
                .map(|t| serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema(),
                    }
                }))
                .collect(),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: Some(options.max_tokens),
            stop: options.stop_sequences.clone(),
            response_format: options.response_schema.as_ref().map(|s| serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": s.name,
                    "schema": s.schema,
                }
            })),
            stream: false,
        }
    }

    fn convert_completion(response: ChatCompletionsResponse) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Parse("completion had no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| -> Result<ToolCall> {
                let arguments: serde_json::Value = if call.function.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&call.function.arguments).map_err(|e| {
                        AgentError::Parse(format!("tool call arguments for '{}': {e}", call.function.name))
                    })?
                };
                Ok(ToolCall::new(call.function.name, arguments).with_id(call.id))
            })
            .collect::<Result<Vec<_>>>()?;

        let finish_reason = choice.finish_reason.as_deref().map(|r| match r {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolUse,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Error,
        });

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: response.model,
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    fn supports_native_tools(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self.authorized(self.client.get(self.endpoint("models")));
        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("OpenAI-compatible health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = Self::build_request(messages, tools, options);
        let request = self
            .authorized(self.client.post(self.endpoint("chat/completions")))
            .json(&body);

        let response: ChatCompletionsResponse = send_json(request).await?;
        Self::convert_completion(response)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::provider::ResponseSchema;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(OpenAiCompatConfig {
            base_url: server.uri(),
            api_key: Some("gsk_test".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_response_schema_becomes_response_format() {
        let options = GenerationOptions {
            temperature: Some(0.0),
            response_schema: Some(ResponseSchema {
                name: "arxiv_results".into(),
                schema: json!({"type": "object"}),
            }),
            ..GenerationOptions::for_model("openai/gpt-oss-20b")
        };
        let request = OpenAiCompatProvider::build_request(&[Message::user("xml")], &[], &options);
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["response_format"]["type"], "json_schema");
        assert_eq!(wire["response_format"]["json_schema"]["name"], "arxiv_results");
        assert_eq!(wire["temperature"], 0.0);
        assert!(wire.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_complete_with_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({"model": "openai/gpt-oss-20b"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "openai/gpt-oss-20b",
                "choices": [{
                    "finish_reason": "tool_calls",
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "searchArxiv", "arguments": "{\"query\":\"agents\",\"maxResults\":3}"}
                        }]
                    }
                }],
                "usage": {"prompt_tokens": 7, "completion_tokens": 3}
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(
                &[Message::user("agents")],
                &[],
                &GenerationOptions::for_model("openai/gpt-oss-20b"),
            )
            .await
            .unwrap();

        assert!(completion.content.is_empty());
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.tool_calls[0].name, "searchArxiv");
        assert_eq!(completion.tool_calls[0].arguments["maxResults"], 3);
    }

    #[tokio::test]
    async fn test_malformed_tool_arguments_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "tool_calls": [{"id": "c", "function": {"name": "searchArxiv", "arguments": "{not json"}}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .complete(&[Message::user("x")], &[], &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(AgentError::Parse(_))));
    }
}
