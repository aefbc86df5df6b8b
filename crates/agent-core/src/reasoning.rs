//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior, bounded by
//! a hard step ceiling. One step is one provider call; tool requests from a
//! step are executed and fed back before the next step. The same ceiling
//! caps tool invocations across the whole run, however many calls a single
//! completion carries.
//!
//! ```text
//! Idle ──▶ AwaitingStep ──▶ (tools ran, steps left) ──▶ AwaitingStep
//!                  │
//!                  └──▶ (no tools ran, or ceiling reached) ──▶ Done
//! ```

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Default step ceiling per request
pub const DEFAULT_MAX_STEPS: usize = 3;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum provider calls per run
    pub max_steps: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Append tool descriptions to the system prompt for providers
    /// without native tool calling
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_steps: DEFAULT_MAX_STEPS,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Be concise and accurate.";

/// Where the loop currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No provider call made yet
    Idle,
    /// A provider call is in flight (or its tool requests are being run)
    AwaitingStep,
    /// Terminal: final text is available
    Done,
}

/// Step and invocation counter enforcing the ceiling independently of any provider
#[derive(Clone, Debug)]
pub struct StepBudget {
    state: LoopState,
    step: usize,
    max_steps: usize,
    invocations: usize,
}

impl StepBudget {
    /// A ceiling of zero is treated as one step
    pub fn new(max_steps: usize) -> Self {
        Self {
            state: LoopState::Idle,
            step: 0,
            max_steps: max_steps.max(1),
            invocations: 0,
        }
    }

    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Steps started so far
    pub const fn steps(&self) -> usize {
        self.step
    }

    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Tool invocations granted so far
    pub const fn invocations(&self) -> usize {
        self.invocations
    }

    /// Enter the next step. Returns `false` once the loop is done.
    pub fn begin_step(&mut self) -> bool {
        if self.state == LoopState::Done || self.step >= self.max_steps {
            self.state = LoopState::Done;
            return false;
        }
        self.step += 1;
        self.state = LoopState::AwaitingStep;
        true
    }

    /// How many of `requested` tool calls may run. The run as a whole gets
    /// at most `max_steps` invocations.
    pub fn grant_invocations(&mut self, requested: usize) -> usize {
        let granted = requested.min(self.max_steps.saturating_sub(self.invocations));
        self.invocations += granted;
        granted
    }

    /// Record the outcome of the current step.
    ///
    /// Returns `true` when tools ran and another step follows, so the model
    /// sees their results; otherwise the loop transitions to `Done`.
    pub fn complete_step(&mut self, ran_tools: bool) -> bool {
        if ran_tools && self.step < self.max_steps {
            return true;
        }
        self.state = LoopState::Done;
        false
    }
}

/// Result of a finished run
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Final text of the last step, verbatim
    pub text: String,
    /// Provider calls made
    pub steps: usize,
    /// Tool calls that were executed, in order
    pub tool_calls: Vec<ToolCall>,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt, including tool descriptions when the
    /// provider needs the text protocol
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions
            && !self.provider.supports_native_tools()
            && !self.tools.is_empty()
        {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Drive the conversation until the model stops requesting tools or the
    /// step ceiling is reached. Tool calls from the final step still run, and
    /// the final step's text is returned as is. Errors from the provider or
    /// any tool abort the run.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<RunOutcome> {
        // Ensure system prompt is set
        if conversation.messages().first().map(|m| &m.role) != Some(&Role::System) {
            let messages = conversation.messages_mut();
            messages.insert(0, Message::system(self.build_system_prompt()));
        }

        let schemas = self.tools.schemas();
        let native = self.provider.supports_native_tools();
        let mut budget = StepBudget::new(self.config.max_steps);
        let mut executed = Vec::new();
        let mut text = String::new();

        while budget.begin_step() {
            tracing::debug!(
                step = budget.steps(),
                max_steps = budget.max_steps(),
                provider = self.provider.name(),
                "Requesting completion"
            );

            let completion = self.provider
                .complete(conversation.messages(), &schemas, &self.config.generation)
                .await?;

            let mut calls = if native {
                completion.tool_calls
            } else {
                self.parse_tool_call(&completion.content).into_iter().collect()
            };
            text = completion.content;

            let granted = budget.grant_invocations(calls.len());
            if granted < calls.len() {
                tracing::warn!(
                    requested = calls.len(),
                    granted,
                    max_invocations = budget.max_steps(),
                    "Tool invocation ceiling reached; dropping tool calls"
                );
                calls.truncate(granted);
            }
            for call in &mut calls {
                call.id.get_or_insert_with(|| uuid::Uuid::new_v4().to_string());
            }

            conversation.push(Message::assistant(&text).with_tool_calls(calls.clone()));

            let ran_tools = !calls.is_empty();
            for call in calls {
                tracing::debug!(tool = %call.name, step = budget.steps(), "Executing tool");

                let result = self.tools.execute(&call).await?;
                let content = if native {
                    result.output.clone()
                } else {
                    Self::format_tool_result(&result)
                };
                conversation.push(Message::tool(content, call.id.clone()));
                executed.push(call);
            }

            if !budget.complete_step(ran_tools) {
                break;
            }
        }

        Ok(RunOutcome {
            text,
            steps: budget.steps(),
            tool_calls: executed,
        })
    }

    /// Run with a simple string input (creates temporary conversation)
    pub async fn ask(&self, question: &str) -> Result<RunOutcome> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(question));
        self.run(&mut conversation).await
    }

    /// Parse a tool call from LLM response text
    fn parse_tool_call(&self, content: &str) -> Option<ToolCall> {
        if self.tools.is_empty() {
            return None;
        }

        // Look for ```tool ... ``` blocks
        let tool_start = "```tool";
        let tool_end = "```";

        content.find(tool_start).and_then(|start_idx| {
            let after_marker = &content[start_idx + tool_start.len()..];
            let end_idx = after_marker.find(tool_end)?;
            serde_json::from_str::<ToolCall>(after_marker[..end_idx].trim()).ok()
        })
        // Fallback: try to find raw JSON with "tool" key
        .or_else(|| Self::parse_inline_tool_call(content))
    }

    /// Try to parse inline JSON tool call
    fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
        if !content.contains(r#""tool""#) {
            return None;
        }

        // Find JSON boundaries
        let start = content.find('{')?;
        let end = content.rfind('}')?;

        if end <= start {
            return None;
        }

        serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
    }

    /// Format tool result for the text protocol
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_steps == 0 {
            return Err(AgentError::Config("max_steps must be at least 1".into()));
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
