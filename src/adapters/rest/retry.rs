//! Retry policy with exponential backoff for transient provider errors.
//!
//! Applied only to idempotent reads. Retry on 429 and 5xx; client errors
//! are fatal. The completion watcher's own no-retry guarantee is
//! unaffected: this layer smooths transport blips, it never re-runs a
//! watch.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::domain::errors::{FleetError, FleetResult};

/// Transport-level error classification used inside the REST adapters.
#[derive(Debug)]
pub enum RestError {
    /// Worth retrying: 429, 5xx, connection failures.
    Retriable(String),
    /// Not worth retrying: 4xx client errors, decode failures.
    Fatal(String),
}

impl RestError {
    /// Classify an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("{status}: {body}");
        if status.as_u16() == 429 || status.is_server_error() {
            Self::Retriable(message)
        } else {
            Self::Fatal(message)
        }
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        // Network-level failures are transient by assumption.
        Self::Retriable(err.to_string())
    }
}

impl From<RestError> for FleetError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Retriable(m) | RestError::Fatal(m) => FleetError::Provider(m),
        }
    }
}

/// Exponential backoff: delay doubles per attempt up to the cap.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Run `operation`, retrying retriable failures with backoff.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> FleetResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RestError>>,
    {
        let mut backoff_ms = self.initial_backoff_ms;
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(RestError::Fatal(message)) => return Err(FleetError::Provider(message)),
                Err(RestError::Retriable(message)) => {
                    if attempt >= self.max_retries {
                        return Err(FleetError::Provider(format!(
                            "exhausted {} retries: {message}",
                            self.max_retries
                        )));
                    }
                    attempt += 1;
                    warn!(attempt, backoff_ms, error = %message, "Transient provider error, retrying");
                    sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(self.max_backoff_ms);
                }
            }
        }
    }
}
