//! Lilith: market pattern recognition and autonomous trading decisions.
//!
//! Only the capability surface exists so far. [`PlaceholderLilith`] answers
//! every call with an empty or neutral result.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use athena_core::config::LilithConfig;
use athena_core::AthenaError;

/// One market observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

/// A recognized market pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub kind: String,
    pub symbol: String,
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}

/// Everything a decision is made from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketContext {
    pub market: String,
    pub data: MarketData,
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub market: String,
    pub action: TradeAction,
    pub confidence: f64,
    pub reasoning: String,
}

#[async_trait]
pub trait Lilith: Send + Sync {
    /// Must be called once before any other operation.
    async fn initialize(&self) -> Result<(), AthenaError>;

    async fn recognize_pattern(&self, data: &MarketData) -> Result<Vec<Pattern>, AthenaError>;

    /// Patterns recognized so far.
    async fn patterns(&self) -> Result<Vec<Pattern>, AthenaError>;

    async fn make_decision(&self, context: &MarketContext) -> Result<Decision, AthenaError>;
}

pub struct PlaceholderLilith {
    config: LilithConfig,
    initialized: AtomicBool,
}

impl PlaceholderLilith {
    pub fn new(config: LilithConfig) -> Self {
        Self {
            config,
            initialized: AtomicBool::new(false),
        }
    }

    fn ensure_initialized(&self) -> Result<(), AthenaError> {
        if self.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AthenaError::NotInitialized("lilith".into()))
        }
    }
}

#[async_trait]
impl Lilith for PlaceholderLilith {
    async fn initialize(&self) -> Result<(), AthenaError> {
        if !self.initialized.swap(true, Ordering::AcqRel) {
            info!(threshold = self.config.confidence_threshold, "Lilith initialized");
        }
        Ok(())
    }

    async fn recognize_pattern(&self, data: &MarketData) -> Result<Vec<Pattern>, AthenaError> {
        self.ensure_initialized()?;
        debug!(symbol = %data.symbol, "Lilith pattern recognition not implemented yet");
        Ok(Vec::new())
    }

    async fn patterns(&self) -> Result<Vec<Pattern>, AthenaError> {
        self.ensure_initialized()?;
        Ok(Vec::new())
    }

    async fn make_decision(&self, context: &MarketContext) -> Result<Decision, AthenaError> {
        self.ensure_initialized()?;
        debug!(market = %context.market, "Lilith decision engine not implemented yet");
        Ok(Decision {
            market: context.market.clone(),
            action: TradeAction::Hold,
            confidence: 0.0,
            reasoning: "decision engine not implemented".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lilith() -> PlaceholderLilith {
        PlaceholderLilith::new(LilithConfig {
            enabled: true,
            confidence_threshold: 0.7,
        })
    }

    fn btc() -> MarketData {
        MarketData {
            symbol: "BTC/USD".into(),
            price: 50_000.0,
            volume: 1_000.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let lilith = lilith();
        let err = lilith.recognize_pattern(&btc()).await.unwrap_err();
        assert!(matches!(err, AthenaError::NotInitialized(ref m) if m == "lilith"));
        assert!(lilith.patterns().await.is_err());
    }

    #[tokio::test]
    async fn placeholder_results_are_neutral() {
        let lilith = lilith();
        lilith.initialize().await.unwrap();
        lilith.initialize().await.unwrap();

        assert!(lilith.recognize_pattern(&btc()).await.unwrap().is_empty());
        assert!(lilith.patterns().await.unwrap().is_empty());

        let context = MarketContext {
            market: "BTC/USD".into(),
            data: btc(),
            patterns: Vec::new(),
        };
        let decision = lilith.make_decision(&context).await.unwrap();
        assert_eq!(decision.action, TradeAction::Hold);
        assert_eq!(decision.market, "BTC/USD");
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn trade_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TradeAction::Hold).unwrap(), "\"hold\"");
    }
}
