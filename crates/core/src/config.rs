use std::env;

use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub scheduler: SchedulerSettings,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub lilith: LilithConfig,
    pub dreamscape: DreamscapeConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// With a non-empty profile (e.g. `PROD`), every key is first looked up
    /// as `{PROFILE}_{KEY}`, falling back to `{KEY}`. Empty string = default.
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            scheduler: SchedulerSettings::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            lilith: LilithConfig::from_env_profiled(p),
            dreamscape: DreamscapeConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings the runtime cannot start with.
    pub fn validate(&self) -> Result<(), AthenaError> {
        if self.scheduler.heartbeat_interval_ms == 0 {
            return Err(AthenaError::Config(
                "HEARTBEAT_INTERVAL_MS must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.lilith.confidence_threshold) {
            return Err(AthenaError::Config(format!(
                "LILITH_CONFIDENCE_THRESHOLD must be within 0.0..=1.0, got {}",
                self.lilith.confidence_threshold
            )));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  scheduler:   heartbeat={}ms", self.scheduler.heartbeat_interval_ms);
        tracing::info!(
            "  llm:         provider={}, configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
        tracing::info!("  ollama:      url={}, model={}", self.ollama.url, self.ollama.model);
        tracing::info!(
            "  lilith:      enabled={}, threshold={}",
            self.lilith.enabled,
            self.lilith.confidence_threshold
        );
        tracing::info!("  dreamscape:  enabled={}", self.dreamscape.enabled);
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Heartbeat tick in milliseconds.
    pub heartbeat_interval_ms: u64,
}

impl SchedulerSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            heartbeat_interval_ms: profiled_env_u64(p, "HEARTBEAT_INTERVAL_MS", 5_000),
        }
    }
}

// ── LLM (OpenAI / Ollama) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "ollama"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 1024),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Lilith ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LilithConfig {
    pub enabled: bool,
    /// Minimum confidence for a recognized pattern to be reported.
    pub confidence_threshold: f64,
}

impl LilithConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "LILITH_ENABLED", true),
            confidence_threshold: profiled_env_or(p, "LILITH_CONFIDENCE_THRESHOLD", "0.7")
                .parse()
                .unwrap_or(0.7),
        }
    }
}

// ── Dreamscape ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamscapeConfig {
    pub enabled: bool,
}

impl DreamscapeConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "DREAMSCAPE_ENABLED", true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("ATHENA_CFG_TEST_A", "plain");
        env::set_var("QA_ATHENA_CFG_TEST_A", "profiled");

        assert_eq!(profiled_env_or("QA", "ATHENA_CFG_TEST_A", "x"), "profiled");
        assert_eq!(profiled_env_or("", "ATHENA_CFG_TEST_A", "x"), "plain");
        assert_eq!(profiled_env_or("OTHER", "ATHENA_CFG_TEST_A", "x"), "plain");
    }

    #[test]
    fn empty_values_fall_back_to_default() {
        env::set_var("ATHENA_CFG_TEST_EMPTY", "");
        assert_eq!(profiled_env_u64("", "ATHENA_CFG_TEST_EMPTY", 42), 42);
        assert_eq!(profiled_env_u64("", "ATHENA_CFG_TEST_MISSING", 7), 7);
    }

    #[test]
    fn bool_parsing() {
        env::set_var("ATHENA_CFG_TEST_BOOL_ON", "Yes");
        env::set_var("ATHENA_CFG_TEST_BOOL_OFF", "0");
        assert!(profiled_env_bool("", "ATHENA_CFG_TEST_BOOL_ON", false));
        assert!(!profiled_env_bool("", "ATHENA_CFG_TEST_BOOL_OFF", true));
        assert!(profiled_env_bool("", "ATHENA_CFG_TEST_BOOL_MISSING", true));
    }

    #[test]
    fn validate_rejects_zero_heartbeat() {
        let mut config = Config::for_profile("ATHENA_CFG_TEST_PROFILE");
        config.scheduler.heartbeat_interval_ms = 0;
        assert!(config.validate().is_err());

        config.scheduler.heartbeat_interval_ms = 5_000;
        config.lilith.confidence_threshold = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = Config::for_profile("ATHENA_CFG_TEST_PROFILE");
        config.scheduler.heartbeat_interval_ms = 1_000;
        config.lilith.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("LILITH_CONFIDENCE_THRESHOLD"));
    }

    #[test]
    fn profile_label_defaults() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
        let config = Config::for_profile("prod");
        assert_eq!(config.profile_label(), "PROD");
    }

    #[test]
    fn llm_configured_by_provider() {
        let mut llm = LlmConfig::from_env_profiled("ATHENA_CFG_TEST_PROFILE");
        llm.provider = "ollama".into();
        assert!(llm.is_configured());
        llm.provider = "openai".into();
        llm.openai_api_key = None;
        assert!(!llm.is_configured());
        llm.openai_api_key = Some("sk-test".into());
        assert!(llm.is_configured());
        llm.provider = "unknown".into();
        assert!(!llm.is_configured());
    }
}
