use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::descriptor::MAX_INTERVAL;

/// TaskMatrix configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Heartbeat tick in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_heartbeat_interval_ms() -> u64 { 5_000 }

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

impl MatrixConfig {
    pub fn with_heartbeat_interval(interval: Duration) -> Self {
        Self {
            heartbeat_interval_ms: interval.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    /// Heartbeat tick as a [`Duration`], clamped to `1ms..=MAX_INTERVAL`.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1)).min(MAX_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MatrixConfig::default();
        assert_eq!(config.heartbeat_interval_ms, 5_000);
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(5));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: MatrixConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.heartbeat_interval_ms, 5_000);

        let config: MatrixConfig = serde_json::from_str(r#"{"heartbeat_interval_ms": 250}"#).unwrap();
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = MatrixConfig { heartbeat_interval_ms: 0 };
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(1));
    }

    #[test]
    fn huge_interval_is_clamped() {
        let config = MatrixConfig { heartbeat_interval_ms: u64::MAX };
        assert_eq!(config.heartbeat_interval(), MAX_INTERVAL);
    }

    #[test]
    fn from_duration() {
        let config = MatrixConfig::with_heartbeat_interval(Duration::from_millis(1_500));
        assert_eq!(config.heartbeat_interval_ms, 1_500);
    }
}
