//! Paper Scout Orchestrator
//!
//! One request in, one answer out. Drives the primary model with the search
//! tool registered and turns any failure into a fixed apology.

use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, LlmProvider, Result as CoreResult, RunOutcome};

use crate::extract::PaperExtractor;
use crate::search::FeedClient;
use crate::svckit::SearchArxivTool;
use crate::{DEFAULT_QUERY, FALLBACK_MESSAGE, SCOUT_SYSTEM_PROMPT};

/// Orchestrator settings
#[derive(Clone, Debug)]
pub struct ScoutConfig {
    /// Primary model name
    pub model: String,
    /// Step ceiling per request
    pub max_steps: usize,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".into(),
            max_steps: agent_core::reasoning::DEFAULT_MAX_STEPS,
        }
    }
}

pub struct Scout {
    agent: Agent,
}

impl Scout {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tool: SearchArxivTool,
        config: &ScoutConfig,
    ) -> CoreResult<Self> {
        let agent = AgentBuilder::new()
            .provider(provider)
            .tool(tool)
            .system_prompt(SCOUT_SYSTEM_PROMPT)
            .model(&config.model)
            .max_steps(config.max_steps)
            .build()?;

        Ok(Self { agent })
    }

    /// Wire the search tool from a feed client and an extractor
    pub fn from_parts(
        provider: Arc<dyn LlmProvider>,
        feed: Arc<dyn FeedClient>,
        extractor: Arc<dyn PaperExtractor>,
        config: &ScoutConfig,
    ) -> CoreResult<Self> {
        Self::new(provider, SearchArxivTool::new(feed, extractor), config)
    }

    /// Blank queries become the default prompt
    pub fn effective_prompt(query: &str) -> &str {
        if query.trim().is_empty() { DEFAULT_QUERY } else { query }
    }

    /// Fallible path: the final text plus what the loop did
    pub async fn run(&self, query: &str) -> CoreResult<RunOutcome> {
        let outcome = self.agent.ask(Self::effective_prompt(query)).await?;
        tracing::info!(
            steps = outcome.steps,
            "Agent completed with {} tool calls",
            outcome.tool_calls.len()
        );
        Ok(outcome)
    }

    /// Never fails: errors are logged and replaced by the apology
    pub async fn handle(&self, query: &str) -> String {
        match self.run(query).await {
            Ok(outcome) => outcome.text,
            Err(e) => {
                tracing::error!(error = %e, "Error running agent");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
