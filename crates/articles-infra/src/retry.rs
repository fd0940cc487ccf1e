//! Startup connection retry with quadratic back-off.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How hard to try before giving up on a backing service at startup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay unit; the n-th failure waits `n² × base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given number of consecutive failures.
    pub fn delay_after(&self, failures: u32) -> Duration {
        self.base_delay * failures.saturating_mul(failures)
    }
}

/// Run `connect` until it succeeds or the policy is exhausted, returning the
/// last error in the latter case.
///
/// Only meant for process startup; steady-state operations never retry.
pub async fn connect_with_retry<T, E, F, Fut>(
    service: &str,
    policy: RetryPolicy,
    mut connect: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = 0;
    loop {
        match connect().await {
            Ok(value) => {
                tracing::info!(service = %service, "Connected");
                return Ok(value);
            }
            Err(e) => {
                failures += 1;
                if failures >= policy.max_attempts {
                    tracing::error!(service = %service, attempts = failures, error = %e, "Could not connect, giving up");
                    return Err(e);
                }
                let delay = policy.delay_after(failures);
                tracing::warn!(
                    service = %service,
                    attempt = failures,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Not ready yet, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
