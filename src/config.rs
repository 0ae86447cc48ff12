//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Wizard engine configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Service name for identification.
    pub name: String,
    /// Session idle timeout (sessions are pruned after this duration).
    pub session_idle_timeout: Duration,
    /// Interval between pruning sweeps.
    pub prune_interval: Duration,
    /// Submission endpoint for completed quote requests (None disables dispatch).
    pub submission_endpoint: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            name: "quoteflow".to_string(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(600),
            submission_endpoint: None,
        }
    }
}

impl WizardConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secs) = std::env::var("QUOTEFLOW_SESSION_IDLE_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            config.session_idle_timeout = Duration::from_secs(secs);
        }
        if let Ok(endpoint) = std::env::var("QUOTEFLOW_SUBMISSION_URL")
            && !endpoint.is_empty()
        {
            config.submission_endpoint = Some(endpoint);
        }
        config
    }
}

/// Chatbot / LLM configuration.
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    /// OpenAI-compatible API key.
    pub api_key: SecretString,
    /// Chat completions endpoint.
    pub api_url: String,
    /// Model identifier.
    pub model: String,
    /// Maximum retained conversation messages.
    pub max_history: usize,
}

impl ChatbotConfig {
    /// Read chatbot configuration from the environment.
    ///
    /// Requires `OPENAI_API_KEY`; everything else has defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
        let api_url = std::env::var("QUOTEFLOW_OPENAI_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let model =
            std::env::var("QUOTEFLOW_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self {
            api_key: SecretString::from(api_key),
            api_url,
            model,
            max_history: DEFAULT_MAX_HISTORY,
        })
    }
}

/// Default bound on retained chat history (user + assistant messages).
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr =
            std::env::var("QUOTEFLOW_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("QUOTEFLOW_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "QUOTEFLOW_PORT".to_string(),
                message: format!("not a valid port: {raw}"),
            })?,
            Err(_) => 8080,
        };
        Ok(Self { bind_addr, port })
    }
}
