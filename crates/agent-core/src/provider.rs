//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all LLM providers (Anthropic, OpenAI-compatible,
//! Ollama, etc.) allowing the agent to work with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = AnthropicProvider::new(config)?;
//! let completion = provider.complete(&messages, &tools, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "claude-sonnet-4-5", "openai/gpt-oss-20b")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic); provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling; provider default when unset
    #[serde(default)]
    pub top_p: Option<f32>,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,

    /// Constrain the output to a JSON schema (structured generation)
    #[serde(default)]
    pub response_schema: Option<ResponseSchema>,
}

const fn default_max_tokens() -> u32 { 4096 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".into(),
            temperature: None,
            max_tokens: default_max_tokens(),
            top_p: None,
            stop_sequences: Vec::new(),
            response_schema: None,
        }
    }
}

impl GenerationOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Named JSON schema for structured output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Response from an LLM completion
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Tool calls requested natively by the provider
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// A plain text completion
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A completion that requests tool calls
    pub fn tool_use(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolUse),
            ..Default::default()
        }
    }

    /// Whether the output was cut off by the token limit
    pub fn truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and health output
    fn name(&self) -> &str;

    /// Whether `complete` returns tool calls in `Completion::tool_calls`.
    ///
    /// Providers without native tool calling get the fenced-block protocol
    /// injected into the system prompt instead.
    fn supports_native_tools(&self) -> bool {
        false
    }

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages, offering the given tools
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

/// Split out the system prompt; most chat APIs take it as a separate field
pub fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let mut system: Vec<&str> = Vec::new();
    let mut rest = Vec::new();
    for message in messages {
        if message.role == crate::message::Role::System {
            system.push(&message.content);
        } else {
            rest.push(message);
        }
    }
    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.temperature, None);
        assert_eq!(opts.max_tokens, 4096);
        assert_eq!(opts.model, "claude-sonnet-4-5");
        assert!(opts.response_schema.is_none());
    }

    #[test]
    fn test_split_system() {
        let messages = vec![
            Message::system("rules"),
            Message::user("hi"),
        ];
        let (system, rest) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("rules"));
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn test_completion_helpers() {
        assert!(Completion::text("done").tool_calls.is_empty());
        let c = Completion { finish_reason: Some(FinishReason::Length), ..Default::default() };
        assert!(c.truncated());
    }
}
