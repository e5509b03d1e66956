//! Prompt-in, text-out facade over an [`LlmProvider`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use athena_core::Config;

use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

/// Per-request overrides. Unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateParameters {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub parameters: GenerateParameters,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            parameters: GenerateParameters::default(),
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.parameters.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.parameters.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
}

#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    system_prompt: Option<String>,
    default_temperature: f32,
    default_max_tokens: u32,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn LlmProvider>, default_temperature: f32, default_max_tokens: u32) -> Self {
        Self {
            provider,
            system_prompt: None,
            default_temperature,
            default_max_tokens,
        }
    }

    /// Build the provider named by `config.llm.provider` and wrap it.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let provider = create_provider(&config.llm, &config.ollama)?;
        Ok(Self::new(provider, config.llm.temperature, config.llm.max_tokens))
    }

    /// System message prepended to every prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("prompt must not be empty".into()));
        }
        let max_tokens = request.parameters.max_tokens.unwrap_or(self.default_max_tokens);
        if max_tokens == 0 {
            return Err(LlmError::InvalidRequest("max_tokens must be > 0".into()));
        }
        let temperature = request.parameters.temperature.unwrap_or(self.default_temperature);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(request.prompt));

        debug!(provider = %self.provider.name(), max_tokens, temperature, "generate");
        let content = self
            .provider
            .complete(messages, temperature, max_tokens)
            .await
            .inspect_err(|e| warn!(provider = %self.provider.name(), error = %e, "generate failed"))?;

        Ok(GenerateResponse { content })
    }
}
