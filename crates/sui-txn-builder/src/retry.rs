//! Transport-level retries for fullnode requests.
//!
//! Only [`SuiClient`](crate::api::SuiClient) retries. The resolution
//! pipeline surfaces ledger failures unchanged and leaves the decision to the
//! caller through [`BuilderError::is_retryable`].

use crate::error::{BuilderError, BuilderResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Backoff policy for a single RPC call.
///
/// Attempt `n` (zero based) waits `base_delay * multiplier^n`, capped at
/// `max_delay`. With jitter enabled the wait is drawn uniformly from
/// `[delay * (1 - spread), delay)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay that jitter may shave off, in `[0, 1]`.
    pub jitter_spread: f64,
    pub transient_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_spread: 0.5,
            transient_statuses: TRANSIENT_STATUSES.to_vec(),
        }
    }
}

impl RetryConfig {
    /// Never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Short, frequent retries for a node on the local machine.
    pub fn local() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(1),
            multiplier: 1.5,
            ..Self::default()
        }
    }

    /// Patient retries for rate-limited public endpoints.
    pub fn public_endpoint() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 3.0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the jitter spread. Zero disables jitter.
    #[must_use]
    pub fn with_jitter_spread(mut self, spread: f64) -> Self {
        self.jitter_spread = spread.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_transient_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.transient_statuses = statuses.into();
        self
    }

    /// Wait before retry number `attempt`, without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(scaled)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter_spread <= 0.0 || delay.is_zero() {
            return delay;
        }
        let keep = rand::thread_rng().gen_range(1.0 - self.jitter_spread, 1.0);
        delay.mul_f64(keep)
    }

    /// Whether `error` should be attempted again under this policy.
    pub fn should_retry(&self, error: &BuilderError) -> bool {
        match error {
            BuilderError::Http(e) => e.is_timeout() || e.is_connect(),
            BuilderError::Api { status_code, .. } => {
                self.transient_statuses.contains(status_code)
            }
            _ => false,
        }
    }
}

/// Runs an operation under a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Calls `operation` until it succeeds, fails permanently, or the retry
    /// allowance runs out. The last error is returned.
    pub async fn execute<T, F, Fut>(&self, label: &str, operation: F) -> BuilderResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = BuilderResult<T>>,
    {
        let mut attempt = 0;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if attempt >= self.config.max_retries || !self.config.should_retry(&error) {
                return Err(error);
            }
            let wait = self.config.jittered(self.config.backoff(attempt));
            attempt += 1;
            warn!(
                call = label,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %error.sanitized_message(),
                "Retrying ledger request"
            );
            tokio::time::sleep(wait).await;
        }
    }
}
