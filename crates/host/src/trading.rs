//! Trading: exchange account access. Not implemented yet.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use athena_core::AthenaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}

#[async_trait]
pub trait Trading: Send + Sync {
    /// Current balances, `None` when no exchange account is connected.
    async fn balances(&self) -> Result<Option<Vec<Balance>>, AthenaError>;
}

#[derive(Debug, Default)]
pub struct PlaceholderTrading;

#[async_trait]
impl Trading for PlaceholderTrading {
    async fn balances(&self) -> Result<Option<Vec<Balance>>, AthenaError> {
        info!("trading balance: trading module not implemented yet");
        Ok(None)
    }
}
