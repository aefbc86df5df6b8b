//! Error Types for the Paper Scout

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The ArXiv API answered with an error entry
    #[error("ArXiv API error: {0}")]
    Api(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Paper {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// Extraction output did not match the paper schema
    #[error("Schema validation failed: {0}")]
    Schema(String),

    /// The extraction model call itself failed
    #[error("Extraction provider error: {0}")]
    Extraction(#[from] AgentError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) fn xml_error(err: impl std::fmt::Display) -> ScoutError {
    ScoutError::Xml(err.to_string())
}

impl From<ScoutError> for AgentError {
    fn from(err: ScoutError) -> Self {
        match err {
            ScoutError::Extraction(inner) => inner,
            ScoutError::Config(msg) => Self::Config(msg),
            ScoutError::Serialization(e) => Self::Json(e),
            other => Self::ToolExecution(other.to_string()),
        }
    }
}
