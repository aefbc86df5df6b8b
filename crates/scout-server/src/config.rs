//! Server Configuration
//!
//! The only place environment variables are read. Everything downstream takes
//! explicit config structs.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use agent_runtime::{AnthropicConfig, OllamaConfig, OpenAiCompatConfig, GROQ_BASE_URL};
use arxiv_scout::extract::DEFAULT_EXTRACTION_MODEL;
use arxiv_scout::search::DEFAULT_ENDPOINT;
use arxiv_scout::ExtractionMode;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which backend answers research requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryProvider {
    Anthropic,
    OpenAi,
    Ollama,
}

impl PrimaryProvider {
    const fn default_model(self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("claude-sonnet-4-5"),
            Self::Ollama => Some("llama3.2"),
            Self::OpenAi => None,
        }
    }
}

impl fmt::Display for PrimaryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        })
    }
}

impl FromStr for PrimaryProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            _ => Err("expected anthropic, openai or ollama".into()),
        }
    }
}

/// Everything the server needs to start
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_filter: String,

    pub provider: PrimaryProvider,
    pub model: String,
    pub anthropic: AnthropicConfig,
    pub openai: OpenAiCompatConfig,
    pub ollama: OllamaConfig,

    /// Groq settings, present only when an API key is configured
    pub groq: Option<OpenAiCompatConfig>,
    pub extraction_model: String,
    pub extraction_mode: ExtractionMode,

    pub arxiv_endpoint: String,
    pub http_timeout: Duration,
    pub max_steps: usize,
}

impl ServerConfig {
    /// Load `.env` (if any), then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let provider = parse(&get, "SCOUT_PROVIDER")?.unwrap_or(PrimaryProvider::Anthropic);

        let model = match (get("SCOUT_MODEL"), provider.default_model()) {
            (Some(model), _) => model,
            (None, Some(default)) => default.to_string(),
            (None, None) => return Err(ConfigError::Missing("SCOUT_MODEL")),
        };

        let anthropic = AnthropicConfig {
            api_key: get("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: or("ANTHROPIC_BASE_URL", &AnthropicConfig::default().base_url),
            ..AnthropicConfig::default()
        };
        if provider == PrimaryProvider::Anthropic && anthropic.api_key.is_empty() {
            return Err(ConfigError::Missing("ANTHROPIC_API_KEY"));
        }

        let openai = OpenAiCompatConfig {
            base_url: get("OPENAI_COMPAT_BASE_URL").unwrap_or_default(),
            api_key: get("OPENAI_COMPAT_API_KEY"),
            ..OpenAiCompatConfig::default()
        };
        if provider == PrimaryProvider::OpenAi && openai.base_url.is_empty() {
            return Err(ConfigError::Missing("OPENAI_COMPAT_BASE_URL"));
        }

        let ollama_defaults = OllamaConfig::default();
        let ollama = OllamaConfig {
            host: or("OLLAMA_HOST", &ollama_defaults.host),
            port: parse(&get, "OLLAMA_PORT")?.unwrap_or(ollama_defaults.port),
            ..ollama_defaults
        };

        let groq = get("GROQ_API_KEY").map(|key| OpenAiCompatConfig {
            base_url: or("GROQ_BASE_URL", GROQ_BASE_URL),
            api_key: Some(key),
            ..OpenAiCompatConfig::default()
        });

        let extraction_mode = match get("SCOUT_EXTRACTION_MODE") {
            Some(raw) => raw.parse::<ExtractionMode>().map_err(|e| ConfigError::Invalid {
                var: "SCOUT_EXTRACTION_MODE",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => ExtractionMode::default_for(groq.is_some()),
        };
        if extraction_mode.needs_model() && groq.is_none() {
            return Err(ConfigError::Missing("GROQ_API_KEY"));
        }

        let max_steps = parse(&get, "SCOUT_MAX_STEPS")?.unwrap_or(agent_core::reasoning::DEFAULT_MAX_STEPS);
        if max_steps == 0 {
            return Err(ConfigError::Invalid {
                var: "SCOUT_MAX_STEPS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            log_filter: or("RUST_LOG", "info,tower_http=debug"),
            provider,
            model,
            anthropic,
            openai,
            ollama,
            groq,
            extraction_model: or("SCOUT_EXTRACTION_MODEL", DEFAULT_EXTRACTION_MODEL),
            extraction_mode,
            arxiv_endpoint: or("ARXIV_ENDPOINT", DEFAULT_ENDPOINT),
            http_timeout: Duration::from_secs(parse(&get, "SCOUT_HTTP_TIMEOUT_SECS")?.unwrap_or(60)),
            max_steps,
        })
    }
}

/// Parse an optional variable, turning bad values into `ConfigError::Invalid`
fn parse<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get(var)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
