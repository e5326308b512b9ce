//! OpenRouter client configuration.

use std::fmt;

use crate::LlmError;

/// Chat backend configuration.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Sent as `HTTP-Referer`; OpenRouter uses it for app attribution.
    pub referer: String,
    /// Sent as `X-Title`.
    pub app_title: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("referer", &self.referer)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            referer: "http://localhost:8000".to_string(),
            app_title: "Harmony Voice Assistant".to_string(),
        }
    }

    /// Create config from the environment.
    ///
    /// Resolution order: `OPENROUTER_API_KEY`, then `OPENAI_API_KEY`.
    /// `LLM_MODEL` overrides the default model.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                LlmError::Config(
                    "LLM backend not configured. Set OPENROUTER_API_KEY or OPENAI_API_KEY."
                        .into(),
                )
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}
