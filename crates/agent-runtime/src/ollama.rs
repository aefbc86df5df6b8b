//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use ollama_rs::{
    generation::{
        chat::{request::ChatMessageRequest, ChatMessage, ChatMessageResponse, MessageRole},
        parameters::FormatType,
        tools::{ToolCall as OllamaToolCall, ToolCallFunction, ToolInfo},
    },
    models::ModelOptions,
    Ollama,
};

use crate::http::{build_client, schema_instruction};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
}

impl OllamaProvider {
    /// Create from configuration. The host must be an absolute URL.
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        reqwest::Url::parse(&config.host)
            .map_err(|e| AgentError::Config(format!("Ollama host '{}': {e}", config.host)))?;

        let http = build_client(config.timeout_secs)?;
        Ok(Self {
            client: Ollama::new_with_client(config.host, config.port, http),
        })
    }

    /// Convert agent messages to Ollama format
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => MessageRole::System,
                    Role::User => MessageRole::User,
                    Role::Assistant => MessageRole::Assistant,
                    Role::Tool => MessageRole::Tool,
                };
                let mut message = ChatMessage::new(role, m.content.clone());
                message.tool_calls = m
                    .tool_calls
                    .iter()
                    .map(|call| OllamaToolCall {
                        function: ToolCallFunction {
                            name: call.name.clone(),
                            arguments: call.arguments_json(),
                        },
                    })
                    .collect();
                message
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolSchema]) -> Result<Vec<ToolInfo>> {
        tools
            .iter()
            .map(|t| {
                let info = serde_json::from_value(serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema(),
                    }
                }))?;
                Ok(info)
            })
            .collect()
    }

    /// Build Ollama generation options; unset values keep the model defaults
    fn build_options(opts: &GenerationOptions) -> ModelOptions {
        let mut options = ModelOptions::default();
        if let Some(temperature) = opts.temperature {
            options = options.temperature(temperature);
        }
        if let Some(top_p) = opts.top_p {
            options = options.top_p(top_p);
        }
        if let Ok(num_predict) = i32::try_from(opts.max_tokens) {
            options = options.num_predict(num_predict);
        }
        if !opts.stop_sequences.is_empty() {
            options = options.stop(opts.stop_sequences.clone());
        }
        options
    }

    fn build_request(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ChatMessageRequest> {
        let mut chat = Self::convert_messages(messages);

        // JSON mode plus the schema spelled out in a leading system turn
        if let Some(schema) = &options.response_schema {
            chat.insert(0, ChatMessage::new(MessageRole::System, schema_instruction(&schema.schema)));
        }

        let mut request = ChatMessageRequest::new(options.model.clone(), chat)
            .options(Self::build_options(options));
        if options.response_schema.is_some() {
            request = request.format(FormatType::Json);
        }
        if !tools.is_empty() {
            request = request.tools(Self::convert_tools(tools)?);
        }
        Ok(request)
    }

    /// Convert Ollama response to agent completion
    fn convert_completion(response: ChatMessageResponse, model: &str) -> Completion {
        // Ollama does not assign tool call IDs
        let tool_calls: Vec<ToolCall> = response
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                ToolCall::new(call.function.name, call.function.arguments)
                    .with_id(uuid::Uuid::new_v4().to_string())
            })
            .collect();

        let finish_reason = if tool_calls.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolUse
        };

        Completion {
            content: response.message.content,
            tool_calls,
            model: model.to_string(),
            usage: response.final_data.map(|d| {
                TokenUsage::new(
                    u32::try_from(d.prompt_eval_count).unwrap_or(u32::MAX),
                    u32::try_from(d.eval_count).unwrap_or(u32::MAX),
                )
            }),
            finish_reason: Some(finish_reason),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn supports_native_tools(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
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
        let request = Self::build_request(messages, tools, options)?;

        let response = self.client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(Self::convert_completion(response, &options.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::ParameterSchema;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OllamaProvider {
        let uri = reqwest::Url::parse(&server.uri()).unwrap();
        OllamaProvider::from_config(OllamaConfig {
            host: format!("http://{}", uri.host_str().unwrap()),
            port: uri.port().unwrap(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn chat_reply(message: serde_json::Value) -> serde_json::Value {
        json!({
            "model": "llama3.2",
            "created_at": "2025-01-01T00:00:00Z",
            "message": message,
            "done": true,
            "total_duration": 1000,
            "load_duration": 10,
            "prompt_eval_count": 12,
            "prompt_eval_duration": 100,
            "eval_count": 4,
            "eval_duration": 100
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
    }

    #[test]
    fn test_rejects_relative_host() {
        let config = OllamaConfig {
            host: "localhost".into(),
            ..OllamaConfig::default()
        };
        assert!(matches!(OllamaProvider::from_config(config), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_message_conversion() {
        let call = ToolCall::new("searchArxiv", json!({"query": "rl"})).with_id("a");
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::assistant("").with_tool_calls(vec![call]),
            Message::tool("[]", Some("a".into())),
        ];

        let converted = OllamaProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 4);
        assert_eq!(converted[2].tool_calls[0].function.name, "searchArxiv");
        assert_eq!(converted[2].tool_calls[0].function.arguments["query"], "rl");
        assert!(matches!(converted[3].role, MessageRole::Tool));
    }

    #[test]
    fn test_tools_convert_to_function_infos() {
        let schema = ToolSchema {
            name: "searchArxiv".into(),
            description: "Search ARXIV".into(),
            parameters: vec![ParameterSchema {
                name: "query".into(),
                param_type: "string".into(),
                description: "The query".into(),
                required: true,
                default: None,
            }],
        };
        let tools = OllamaProvider::convert_tools(&[schema]).unwrap();
        let wire = serde_json::to_value(&tools).unwrap();
        assert_eq!(wire[0]["type"], "function");
        assert_eq!(wire[0]["function"]["name"], "searchArxiv");
        assert_eq!(wire[0]["function"]["parameters"]["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_complete_assigns_tool_call_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3.2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "searchArxiv", "arguments": {"query": "rl"}}}]
            }))))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(&[Message::user("rl")], &[], &GenerationOptions::for_model("llama3.2"))
            .await
            .unwrap();

        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert!(completion.tool_calls[0].id.is_some());
        assert_eq!(completion.tool_calls[0].arguments["query"], "rl");
        assert_eq!(completion.usage.unwrap().total_tokens, 16);
    }

    #[tokio::test]
    async fn test_schema_requests_json_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"format": "json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
                "role": "assistant",
                "content": "{\"papers\": []}"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let options = GenerationOptions {
            temperature: Some(0.0),
            response_schema: Some(agent_core::provider::ResponseSchema {
                name: "papers".into(),
                schema: json!({"type": "object"}),
            }),
            ..GenerationOptions::for_model("llama3.2")
        };
        let completion = provider_for(&server)
            .complete(&[Message::user("xml")], &[], &options)
            .await
            .unwrap();

        assert_eq!(completion.content, "{\"papers\": []}");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_provider_error() {
        let provider = OllamaProvider::from_config(OllamaConfig {
            host: "http://127.0.0.1".into(),
            port: 9,
            timeout_secs: 2,
        })
        .unwrap();

        assert!(!provider.health_check().await.unwrap());
        let result = provider
            .complete(&[Message::user("hi")], &[], &GenerationOptions::for_model("llama3.2"))
            .await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }
}
