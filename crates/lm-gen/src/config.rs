use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and polling knobs for the generation pipeline.
///
/// Every field has a default, so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Retries after the first attempt, transient failures only.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    /// Wait between video status polls.
    pub poll_interval_ms: u64,
    /// Give up on a video after this many polls.
    pub max_polls: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
            poll_interval_ms: 10_000,
            max_polls: 60,
        }
    }
}

impl GenerationConfig {
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::default()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.base_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .multiplier(self.backoff_multiplier)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{ "max_retries": 5, "poll_interval_ms": 500 }"#).unwrap();
        assert_eq!(
            config,
            GenerationConfig {
                max_retries: 5,
                poll_interval_ms: 500,
                ..GenerationConfig::default()
            }
        );
    }

    #[test]
    fn retry_config_follows_fields() {
        let retry = GenerationConfig::default().retry();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.initial_delay, Duration::from_secs(2));
        assert_eq!(retry.max_delay, Duration::from_secs(30));
    }
}
