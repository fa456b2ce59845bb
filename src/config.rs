use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Model endpoint configuration, loaded from geo_prompt.toml and environment variables
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_ms: 60_000,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

impl ModelConfig {
    /// Load configuration from TOML file and environment variables.
    /// Uses GEO_PROMPT_CONFIG or defaults to "geo_prompt.toml"
    pub fn load() -> Result<Self> {
        // GEO_PROMPT_ENV_FILE if set, otherwise ./.env
        match std::env::var("GEO_PROMPT_ENV_FILE") {
            Ok(env_path) => {
                let _ = dotenvy::from_path(env_path);
            }
            Err(_) => {
                let _ = dotenvy::from_path(".env");
            }
        }

        let config_path =
            std::env::var("GEO_PROMPT_CONFIG").unwrap_or_else(|_| "geo_prompt.toml".to_string());

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GenerationError::Config {
            message: format!("invalid config file: {e}"),
        })
    }

    /// Apply environment overrides (env-first)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("GEO_MODEL_ENDPOINT") {
            self.endpoint = endpoint;
            tracing::debug!("GEO_MODEL_ENDPOINT env override applied");
        }
        if let Ok(model) = std::env::var("GEO_MODEL_NAME") {
            self.model = model;
        }
        let non_blank = |name: &str| std::env::var(name).ok().filter(|k| !k.trim().is_empty());
        if let Some(key) = non_blank("GEO_MODEL_API_KEY").or_else(|| non_blank("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(timeout) = std::env::var("GEO_MODEL_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.timeout_ms = timeout;
        }
        if let Some(temperature) = std::env::var("GEO_MODEL_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = std::env::var("GEO_MODEL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.max_tokens = max_tokens;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(GenerationError::Config { message });

        if self.model.trim().is_empty() {
            return fail("model name must not be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return fail(format!(
                "endpoint '{}' must start with http:// or https://",
                self.endpoint
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return fail(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.temperature
            ));
        }
        if self.timeout_ms == 0 {
            return fail("timeout_ms must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return fail("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Endpoint with the chat-completions path appended when missing
    pub fn completions_url(&self) -> String {
        if self.endpoint.ends_with("/chat/completions") {
            self.endpoint.clone()
        } else {
            format!("{}{}", self.endpoint.trim_end_matches('/'), COMPLETIONS_PATH)
        }
    }
}
