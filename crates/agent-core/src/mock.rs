//! Scripted provider for deterministic tests and offline runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider};
use crate::tool::ToolSchema;

enum Reply {
    Completion(Completion),
    Error(AgentError),
}

/// A request the provider received
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    /// Names of the tools offered
    pub tools: Vec<String>,
    pub options: GenerationOptions,
}

/// Replays queued completions in order, then fails (or repeats a fixed reply)
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    repeat: Option<Completion>,
    requests: Mutex<Vec<RecordedRequest>>,
    native_tools: bool,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
            native_tools: true,
        }
    }

    /// Answer every call with the same completion once the queue runs dry
    pub fn repeating(completion: Completion) -> Self {
        Self {
            repeat: Some(completion),
            ..Self::new()
        }
    }

    /// Behave like a provider that only speaks the fenced tool protocol
    #[must_use]
    pub const fn without_native_tools(mut self) -> Self {
        self.native_tools = false;
        self
    }

    pub async fn push(&self, completion: Completion) {
        self.replies.lock().await.push_back(Reply::Completion(completion));
    }

    pub async fn push_error(&self, error: AgentError) {
        self.replies.lock().await.push_back(Reply::Error(error));
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn supports_native_tools(&self) -> bool {
        self.native_tools
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            options: options.clone(),
        });

        match self.replies.lock().await.pop_front() {
            Some(Reply::Completion(completion)) => Ok(completion),
            Some(Reply::Error(error)) => Err(error),
            None => self
                .repeat
                .clone()
                .ok_or_else(|| AgentError::Provider("script exhausted".into())),
        }
    }
}
