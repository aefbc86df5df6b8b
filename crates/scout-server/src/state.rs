//! Application State

use std::sync::Arc;

use agent_core::LlmProvider;
use agent_runtime::{AnthropicProvider, OllamaProvider, OpenAiCompatProvider};
use arxiv_scout::{build_extractor, ArxivHttpClient, ExtractionMode, Scout, ScoutConfig};

use crate::config::{PrimaryProvider, ServerConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared by every request
    pub scout: Arc<Scout>,

    /// Primary model backend, for health checks
    pub provider: Arc<dyn LlmProvider>,

    pub provider_kind: PrimaryProvider,
    pub extraction_mode: ExtractionMode,
}

impl AppState {
    /// Construct providers, feed client and orchestrator from configuration
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let provider: Arc<dyn LlmProvider> = match config.provider {
            PrimaryProvider::Anthropic => Arc::new(AnthropicProvider::new(config.anthropic.clone())?),
            PrimaryProvider::OpenAi => Arc::new(OpenAiCompatProvider::new(config.openai.clone())?),
            PrimaryProvider::Ollama => Arc::new(OllamaProvider::from_config(config.ollama.clone())?),
        };

        let extraction_model = match &config.groq {
            Some(groq) => {
                let groq: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(groq.clone())?);
                Some((groq, config.extraction_model.clone()))
            }
            None => None,
        };
        let extractor = build_extractor(config.extraction_mode, extraction_model)?;
        let feed = ArxivHttpClient::new(&config.arxiv_endpoint, config.http_timeout)?;

        let scout_config = ScoutConfig {
            model: config.model.clone(),
            max_steps: config.max_steps,
        };
        let scout = Scout::from_parts(provider.clone(), Arc::new(feed), extractor, &scout_config)?;

        tracing::info!(
            provider = %config.provider,
            model = %config.model,
            extraction = %config.extraction_mode,
            max_steps = config.max_steps,
            "Scout configured"
        );

        Ok(Self {
            scout: Arc::new(scout),
            provider,
            provider_kind: config.provider,
            extraction_mode: config.extraction_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_minimal_config() {
        let config = ServerConfig::from_lookup(|key| (key == "ANTHROPIC_API_KEY").then(|| "sk-test".to_string())).unwrap();
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.provider.name(), "Anthropic");
        assert_eq!(state.extraction_mode, ExtractionMode::Atom);
    }

    #[test]
    fn test_state_with_groq_extraction() {
        let config = ServerConfig::from_lookup(|key| match key {
            "SCOUT_PROVIDER" => Some("ollama".into()),
            "GROQ_API_KEY" => Some("gsk-test".into()),
            _ => None,
        })
        .unwrap();
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.provider_kind, PrimaryProvider::Ollama);
        assert_eq!(state.extraction_mode, ExtractionMode::AtomThenLlm);
    }
}
