//! Bounded-retry envelope with exponential backoff.
//!
//! Every external capability call goes through [`RetryPolicy::run`]. The
//! envelope only bounds how often a call is attempted; it never decides
//! whether a failure is tolerable, that is the calling stage's job.
//! Validation failures are not transient and are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Retry bounds for one external call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds.
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_factor: u32) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff_factor,
        }
    }

    /// Run `op`, retrying transient failures until the attempt budget is
    /// exhausted. Each failed attempt is logged at warn level with its
    /// attempt index; the last error is propagated unchanged. The sleep
    /// between attempts suspends only the calling task.
    pub async fn run<T, F, Fut>(&self, call: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        let mut delay = self.initial_delay;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_transient() => return Err(error),
                Err(error) => {
                    tracing::warn!(call, attempt, error = %error, "call attempt failed");
                    if attempt >= self.max_attempts {
                        return Err(error);
                    }
                    tokio::time::sleep(delay).await;
                    delay *= self.backoff_factor;
                    attempt += 1;
                }
            }
        }
    }
}
