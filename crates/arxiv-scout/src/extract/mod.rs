//! Structured Extraction
//!
//! Turns a raw feed body into validated paper records. Every strategy either
//! returns fully valid papers or fails; there are no partial results.

mod atom;
mod llm;

pub use atom::AtomExtractor;
pub use llm::{LlmExtractor, DEFAULT_EXTRACTION_MODEL};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use agent_core::LlmProvider;

use crate::error::{Result, ScoutError};
use crate::model::Paper;

/// Extraction strategy trait
#[async_trait]
pub trait PaperExtractor: Send + Sync {
    async fn extract(&self, feed: &str) -> Result<Vec<Paper>>;

    /// Strategy name for logs
    fn name(&self) -> &str;
}

/// Run `primary`; if it fails, log and run `fallback`
pub struct FallbackExtractor {
    primary: Arc<dyn PaperExtractor>,
    fallback: Arc<dyn PaperExtractor>,
    name: String,
}

impl FallbackExtractor {
    pub fn new(primary: Arc<dyn PaperExtractor>, fallback: Arc<dyn PaperExtractor>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }
}

#[async_trait]
impl PaperExtractor for FallbackExtractor {
    async fn extract(&self, feed: &str) -> Result<Vec<Paper>> {
        match self.primary.extract(feed).await {
            Ok(papers) => Ok(papers),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Extraction failed, falling back"
                );
                self.fallback.extract(feed).await
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Which strategy the search tool uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Deterministic Atom parsing only
    Atom,
    /// Secondary model only
    Llm,
    /// Atom parsing, model on failure
    AtomThenLlm,
}

impl ExtractionMode {
    /// `AtomThenLlm` when an extraction model is available
    pub const fn default_for(has_model: bool) -> Self {
        if has_model { Self::AtomThenLlm } else { Self::Atom }
    }

    pub const fn needs_model(self) -> bool {
        matches!(self, Self::Llm | Self::AtomThenLlm)
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Atom => "atom",
            Self::Llm => "llm",
            Self::AtomThenLlm => "atom+llm",
        })
    }
}

impl FromStr for ExtractionMode {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atom" => Ok(Self::Atom),
            "llm" => Ok(Self::Llm),
            "atom+llm" => Ok(Self::AtomThenLlm),
            other => Err(ScoutError::Config(format!(
                "unknown extraction mode '{other}' (expected atom, llm or atom+llm)"
            ))),
        }
    }
}

/// Assemble the extractor for `mode`. `model` is the secondary provider and
/// the model name to request from it.
pub fn build_extractor(
    mode: ExtractionMode,
    model: Option<(Arc<dyn LlmProvider>, String)>,
) -> Result<Arc<dyn PaperExtractor>> {
    let llm = || {
        model
            .clone()
            .map(|(provider, name)| Arc::new(LlmExtractor::new(provider, name)) as Arc<dyn PaperExtractor>)
            .ok_or_else(|| ScoutError::Config(format!("extraction mode '{mode}' needs an extraction model")))
    };

    let extractor: Arc<dyn PaperExtractor> = match mode {
        ExtractionMode::Atom => Arc::new(AtomExtractor::new()),
        ExtractionMode::Llm => llm()?,
        ExtractionMode::AtomThenLlm => Arc::new(FallbackExtractor::new(Arc::new(AtomExtractor::new()), llm()?)),
    };
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{sample_paper, SearchResults};
    use crate::search::SAMPLE_FEED;
    use agent_core::mock::ScriptedProvider;
    use agent_core::Completion;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("atom".parse::<ExtractionMode>().unwrap(), ExtractionMode::Atom);
        assert_eq!(" LLM ".parse::<ExtractionMode>().unwrap(), ExtractionMode::Llm);
        assert_eq!("atom+llm".parse::<ExtractionMode>().unwrap(), ExtractionMode::AtomThenLlm);
        assert!("regex".parse::<ExtractionMode>().is_err());
        assert_eq!(ExtractionMode::AtomThenLlm.to_string(), "atom+llm");
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(ExtractionMode::default_for(true), ExtractionMode::AtomThenLlm);
        assert_eq!(ExtractionMode::default_for(false), ExtractionMode::Atom);
    }

    #[test]
    fn test_llm_mode_requires_model() {
        assert!(build_extractor(ExtractionMode::Llm, None).is_err());
        assert!(build_extractor(ExtractionMode::AtomThenLlm, None).is_err());
        assert_eq!(build_extractor(ExtractionMode::Atom, None).unwrap().name(), "atom");
    }

    #[tokio::test]
    async fn test_fallback_only_on_failure() {
        let provider = Arc::new(ScriptedProvider::new());
        let reply = serde_json::to_string(&SearchResults { papers: vec![sample_paper("From model")] }).unwrap();
        provider.push(Completion::text(reply)).await;

        let model: Arc<dyn LlmProvider> = provider.clone();
        let extractor = build_extractor(ExtractionMode::AtomThenLlm, Some((model, "m".into()))).unwrap();
        assert_eq!(extractor.name(), "atom+llm");

        // Well-formed feed: the model is never asked
        assert_eq!(extractor.extract(SAMPLE_FEED).await.unwrap().len(), 2);
        assert_eq!(provider.remaining().await, 1);

        let papers = extractor.extract("<html>not a feed</html>").await.unwrap();
        assert_eq!(papers[0].title, "From model");
        assert_eq!(provider.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_fallback_error_surfaces() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push(Completion::text("no json here")).await;

        let model: Arc<dyn LlmProvider> = provider;
        let extractor = build_extractor(ExtractionMode::AtomThenLlm, Some((model, "m".into()))).unwrap();
        assert!(matches!(extractor.extract("junk").await, Err(ScoutError::Schema(_))));
    }
}
