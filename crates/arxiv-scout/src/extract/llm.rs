//! Model-backed Extractor
//!
//! Hands the raw feed to a fast secondary model with a fixed JSON schema and
//! validates whatever comes back.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{GenerationOptions, LlmProvider, Message, ResponseSchema};

use super::PaperExtractor;
use crate::error::{Result, ScoutError};
use crate::model::{Paper, SearchResults};

/// Default extraction model (served by Groq)
pub const DEFAULT_EXTRACTION_MODEL: &str = "openai/gpt-oss-20b";

const SYSTEM_PROMPT: &str = "You are a fast XML parser. Extract paper information from ArXiv XML response.";

const SCHEMA_NAME: &str = "arxiv_results";

pub struct LlmExtractor {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: Some(0.0),
            response_schema: Some(ResponseSchema {
                name: SCHEMA_NAME.into(),
                schema: SearchResults::json_schema(),
            }),
            ..GenerationOptions::for_model(&self.model)
        }
    }
}

/// Find the JSON object in a reply that may carry a code fence or prose
fn locate_json(reply: &str) -> Option<&str> {
    let body = reply
        .split_once("```json")
        .and_then(|(_, rest)| rest.split_once("```"))
        .map_or(reply, |(inner, _)| inner);

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

#[async_trait]
impl PaperExtractor for LlmExtractor {
    async fn extract(&self, feed: &str) -> Result<Vec<Paper>> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Parse this ArXiv XML and extract all papers:\n\n{feed}")),
        ];

        let completion = self.provider.complete(&messages, &[], &self.options()).await?;
        tracing::debug!(
            provider = self.provider.name(),
            chars = completion.content.len(),
            "Extraction model replied"
        );

        let json = locate_json(&completion.content)
            .ok_or_else(|| ScoutError::Schema("no JSON object in extraction reply".into()))?;
        let results: SearchResults =
            serde_json::from_str(json).map_err(|e| ScoutError::Schema(e.to_string()))?;
        results.validate()?;

        Ok(results.papers)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
