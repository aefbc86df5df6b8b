//! Anthropic LLM Provider
//!
//! Implementation of `LlmProvider` over the Messages API with native tool use.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{split_system, Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, schema_instruction, send_json};

/// Anthropic provider configuration
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`
    pub api_key: String,

    /// API base URL (no trailing `/v1`)
    pub base_url: String,

    /// Value of the `anthropic-version` header
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com".into(),
            api_version: "2023-06-01".into(),
            timeout_secs: 120,
        }
    }
}

impl AnthropicConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("Anthropic API key is required".into()));
        }

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
    }

    /// Convert agent messages to Messages API turns.
    ///
    /// Consecutive messages with the same wire role are merged, and tool
    /// results become `tool_result` blocks in a user turn.
    fn convert_messages(messages: &[&Message]) -> Vec<WireMessage> {
        let mut turns: Vec<WireMessage> = Vec::new();

        for message in messages {
            let (role, blocks) = match message.role {
                Role::System | Role::User => ("user", vec![ContentBlock::text(&message.content)]),
                Role::Assistant => {
                    let mut blocks = Vec::new();
                    if !message.content.trim().is_empty() {
                        blocks.push(ContentBlock::text(&message.content));
                    }
                    for call in &message.tool_calls {
                        blocks.push(ContentBlock::ToolUse {
                            id: call.id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                            name: call.name.clone(),
                            input: call.arguments_json(),
                        });
                    }
                    ("assistant", blocks)
                }
                Role::Tool => {
                    let block = match &message.tool_call_id {
                        Some(id) => ContentBlock::ToolResult {
                            tool_use_id: id.clone(),
                            content: message.content.clone(),
                        },
                        None => ContentBlock::text(&message.content),
                    };
                    ("user", vec![block])
                }
            };

            if blocks.is_empty() {
                continue;
            }

            match turns.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => turns.push(WireMessage { role, content: blocks }),
            }
        }

        turns
    }

    fn build_request(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> MessagesRequest {
        let (mut system, rest) = split_system(messages);

        if let Some(schema) = &options.response_schema {
            let instruction = schema_instruction(&schema.schema);
            system = Some(match system {
                Some(s) => format!("{s}\n\n{instruction}"),
                None => instruction,
            });
        }

        MessagesRequest {
            model: options.model.clone(),
            max_tokens: options.max_tokens,
            system,
            messages: Self::convert_messages(&rest),
            tools: tools
                .iter()
                .map(|t| WireTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.input_schema(),
                })
                .collect(),
            temperature: options.temperature,
            top_p: options.top_p,
            stop_sequences: options.stop_sequences.clone(),
        }
    }

    fn convert_completion(response: MessagesResponse) -> Completion {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ContentBlock::Text { text: t } => text.push_str(&t),
                ContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::new(name, input).with_id(id));
                }
                ContentBlock::ToolResult { .. } | ContentBlock::Unknown => {}
            }
        }

        let finish_reason = response.stop_reason.as_deref().map(|r| match r {
            "end_turn" | "stop_sequence" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            "tool_use" => FinishReason::ToolUse,
            "refusal" => FinishReason::ContentFilter,
            _ => FinishReason::Error,
        });

        Completion {
            content: text,
            tool_calls,
            model: response.model,
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
            finish_reason,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn supports_native_tools(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self.authorized(self.client.get(self.endpoint("models")));
        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Anthropic health check failed: {}", e);
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
            .authorized(self.client.post(self.endpoint("messages")))
            .json(&body);

        let response: MessagesResponse = send_json(request).await?;
        Ok(Self::convert_completion(response))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    fn text(text: &str) -> Self {
        Self::Text { text: text.to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}
