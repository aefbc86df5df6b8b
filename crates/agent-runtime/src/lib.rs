//! # agent-runtime
//!
//! Runtime providers for the agent system.
//!
//! ## Providers
//!
//! - **Anthropic**: Messages API with native tool use
//! - **OpenAI-compatible**: any `/chat/completions` endpoint (Groq by default),
//!   with function calling and JSON-schema response formats
//! - **Ollama**: local inference through `ollama-rs`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{AnthropicConfig, AnthropicProvider};
//!
//! let provider = AnthropicProvider::new(AnthropicConfig::with_api_key(key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

mod http;

pub mod anthropic;
pub mod ollama;
pub mod openai_compat;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider, GROQ_BASE_URL};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry,
};
