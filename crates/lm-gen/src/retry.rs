//! Retry policy for transient remote failures.
//!
//! Exponential backoff without jitter: attempt `n` (0-based) waits
//! `initial_delay · multiplier^n`, capped at `max_delay`.

use crate::error::GenerationError;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, mult: f64) -> Self {
        self.multiplier = mult.max(1.0);
        self
    }
}

/// Exponential backoff calculator
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: RetryConfig,
    attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Get the next delay, or None if max retries exceeded
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_retries {
            return None;
        }
        let delay = self.delay_for(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay.as_millis() as f64;
        let scaled = base * self.config.multiplier.powi(attempt as i32);
        let capped = scaled.min(self.config.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

/// Runs async operations, retrying the failures a predicate accepts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Retry transient [`GenerationError`]s; everything else fails fast.
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        self.execute_if(label, operation, GenerationError::is_transient)
            .await
    }

    /// Execute with a custom retry condition
    pub async fn execute_if<F, Fut, T, E, C>(
        &self,
        label: &str,
        mut operation: F,
        should_retry: C,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        C: Fn(&E) -> bool,
    {
        let mut backoff = ExponentialBackoff::new(self.config.clone());

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if should_retry(&e) => match backoff.next_delay() {
                    Some(delay) => {
                        log::debug!(
                            "{label}: attempt {} failed ({e}), retrying in {}ms",
                            backoff.attempt(),
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        log::warn!("{label}: giving up after {} retries: {e}", backoff.attempt());
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Retry `operation` under `config`, transient failures only.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    label: &str,
    operation: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    RetryPolicy::new(config.clone()).run(label, operation).await
}
