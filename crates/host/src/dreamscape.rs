//! Dreamscape: consciousness mapping and dream pattern recognition.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use athena_core::config::DreamscapeConfig;
use athena_core::AthenaError;

use crate::lilith::Pattern;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamContext {
    pub environment: String,
    pub time_of_day: String,
    pub emotional_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamData {
    pub symbols: Vec<String>,
    pub emotions: Vec<String>,
    pub context: DreamContext,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the mapped consciousness state. All levels are in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessState {
    pub awareness: f64,
    pub coherence: f64,
    pub integrated_patterns: u64,
    pub mapped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamPattern {
    pub id: String,
    pub symbols: Vec<String>,
    pub significance: f64,
}

#[async_trait]
pub trait Dreamscape: Send + Sync {
    async fn initialize(&self) -> Result<(), AthenaError>;

    async fn map_consciousness(&self) -> Result<ConsciousnessState, AthenaError>;

    async fn recognize_dream_pattern(&self, dream: &DreamData) -> Result<Vec<DreamPattern>, AthenaError>;

    /// Feed Lilith's market patterns into the dream model.
    async fn integrate_with_lilith(&self, patterns: &[Pattern]) -> Result<(), AthenaError>;
}

pub struct PlaceholderDreamscape {
    config: DreamscapeConfig,
    initialized: AtomicBool,
    integrated: AtomicU64,
}

impl PlaceholderDreamscape {
    pub fn new(config: DreamscapeConfig) -> Self {
        Self {
            config,
            initialized: AtomicBool::new(false),
            integrated: AtomicU64::new(0),
        }
    }

    fn ensure_initialized(&self) -> Result<(), AthenaError> {
        if self.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AthenaError::NotInitialized("dreamscape".into()))
        }
    }
}

#[async_trait]
impl Dreamscape for PlaceholderDreamscape {
    async fn initialize(&self) -> Result<(), AthenaError> {
        if !self.initialized.swap(true, Ordering::AcqRel) {
            info!(enabled = self.config.enabled, "Dreamscape initialized");
        }
        Ok(())
    }

    async fn map_consciousness(&self) -> Result<ConsciousnessState, AthenaError> {
        self.ensure_initialized()?;
        debug!("Dreamscape consciousness mapping not implemented yet");
        Ok(ConsciousnessState {
            awareness: 0.0,
            coherence: 0.0,
            integrated_patterns: self.integrated.load(Ordering::Relaxed),
            mapped_at: Utc::now(),
        })
    }

    async fn recognize_dream_pattern(&self, dream: &DreamData) -> Result<Vec<DreamPattern>, AthenaError> {
        self.ensure_initialized()?;
        debug!(
            symbols = dream.symbols.len(),
            environment = %dream.context.environment,
            "Dreamscape pattern recognition not implemented yet"
        );
        Ok(Vec::new())
    }

    async fn integrate_with_lilith(&self, patterns: &[Pattern]) -> Result<(), AthenaError> {
        self.ensure_initialized()?;
        self.integrated.fetch_add(patterns.len() as u64, Ordering::Relaxed);
        debug!(patterns = patterns.len(), "integrated Lilith patterns");
        Ok(())
    }
}
