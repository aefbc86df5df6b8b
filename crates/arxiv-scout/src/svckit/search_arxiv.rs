//! ArXiv Search Tool
//!
//! Fetches one ArXiv result page and returns the extracted papers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use agent_core::{
    AgentError, Tool, ToolSchema, ToolCall, ToolResult,
    tool::ParameterSchema,
    Result as CoreResult,
};

use crate::extract::PaperExtractor;
use crate::search::{FeedClient, SearchRequest, DEFAULT_MAX_RESULTS};

/// Name the model calls the tool by
pub const TOOL_NAME: &str = "searchArxiv";

/// Result limit from the raw `maxResults` argument.
///
/// Anything that is not a positive number falls back to the default.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn effective_max_results(value: Option<&Value>) -> u32 {
    value
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64)))
        .filter(|n| *n > 0)
        .map_or(DEFAULT_MAX_RESULTS, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Tool for searching ArXiv papers
pub struct SearchArxivTool {
    feed: Arc<dyn FeedClient>,
    extractor: Arc<dyn PaperExtractor>,
}

impl SearchArxivTool {
    pub fn new(feed: Arc<dyn FeedClient>, extractor: Arc<dyn PaperExtractor>) -> Self {
        Self { feed, extractor }
    }
}

#[async_trait]
impl Tool for SearchArxivTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Search ARXIV".into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "The query to use to search".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "maxResults".into(),
                    param_type: "integer".into(),
                    description: "Maximum number of papers to return (default 5)".into(),
                    required: false,
                    default: Some(Value::from(DEFAULT_MAX_RESULTS)),
                },
            ],
        }
    }

    /// Only `query` is checked; a malformed `maxResults` means the default
    fn validate(&self, call: &ToolCall) -> CoreResult<()> {
        match call.arguments.get("query") {
            Some(Value::String(_)) => Ok(()),
            Some(_) => Err(AgentError::ToolValidation("Parameter 'query' must be of type string".into())),
            None => Err(AgentError::ToolValidation("Missing required parameter: query".into())),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        self.validate(call)?;
        let query = call.arguments
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let max_results = effective_max_results(call.arguments.get("maxResults"));

        let request = SearchRequest::new(query, max_results);
        let body = self.feed.fetch(&request).await?;

        let mut papers = self.extractor.extract(&body).await?;
        papers.truncate(max_results as usize);

        tracing::debug!(
            %query,
            max_results,
            found = papers.len(),
            feed = self.feed.name(),
            extractor = self.extractor.name(),
            "ArXiv search finished"
        );

        let annotated = papers
            .iter()
            .map(|paper| {
                let mut value = serde_json::to_value(paper)?;
                value["aiRelated"] = Value::Bool(paper.is_ai_related());
                Ok(value)
            })
            .collect::<serde_json::Result<Vec<_>>>()?;

        let output = serde_json::to_string(&annotated)?;
        Ok(ToolResult::success(TOOL_NAME, output).with_data(serde_json::to_value(&papers)?))
    }
}
