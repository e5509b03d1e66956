pub mod ollama;
pub mod openai;

use std::sync::Arc;

use athena_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or(OPENAI_DEFAULT_BASE_URL);
            Ok(Arc::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.to_string(),
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str, key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            openai_api_key: key.map(str::to_string),
            openai_model: "gpt-4o".into(),
            openai_base_url: None,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    fn ollama() -> OllamaConfig {
        OllamaConfig {
            url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
        }
    }

    #[test]
    fn selects_provider_by_name() {
        let p = create_provider(&llm("ollama", None), &ollama()).unwrap();
        assert_eq!(p.name(), "ollama");

        let p = create_provider(&llm("openai", Some("sk-test")), &ollama()).unwrap();
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn openai_requires_key() {
        let err = create_provider(&llm("openai", None), &ollama()).err().unwrap();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = create_provider(&llm("gemini", None), &ollama()).err().unwrap();
        assert!(err.to_string().contains("unknown LLM provider: 'gemini'"));
    }
}
