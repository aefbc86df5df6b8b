//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a step-bounded
//! tool loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │ Loop (≤ N)  │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Anthropic, OpenAI-compatible
//! APIs, Ollama, or the scripted mock without changing agent logic.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod mock;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ResponseSchema};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, LoopState, RunOutcome, StepBudget};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolResult, ToolRegistry, ToolSchema};
