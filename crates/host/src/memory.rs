//! Memory: long-term storage of runtime observations. Not implemented yet.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use athena_core::AthenaError;

#[async_trait]
pub trait Memory: Send + Sync {
    /// Persist the latest scheduler heartbeat (`None` if it never ticked).
    async fn store_heartbeat(&self, last_heartbeat: Option<DateTime<Utc>>) -> Result<(), AthenaError>;
}

#[derive(Debug, Default)]
pub struct PlaceholderMemory;

#[async_trait]
impl Memory for PlaceholderMemory {
    async fn store_heartbeat(&self, last_heartbeat: Option<DateTime<Utc>>) -> Result<(), AthenaError> {
        info!(?last_heartbeat, "memory update: memory module not implemented yet");
        Ok(())
    }
}
