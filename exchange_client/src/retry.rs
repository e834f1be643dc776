//! Bounded retry with exponential backoff.
//!
//! Retry is an explicit loop over an attempt count and a delay, not a
//! type: callers pass a predicate deciding which errors are worth a
//! re-attempt, and everything else surfaces immediately.

use std::fmt::Display;
use std::time::Duration;

/// Attempt count and backoff schedule for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Runs `op` until it succeeds, a non-retriable error occurs, or the
/// policy's attempt budget is exhausted. Only errors for which
/// `retryable` returns true are retried; the delay doubles per attempt.
pub fn with_backoff<T, E: Display>(
    policy: &RetryPolicy,
    retryable: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let mut delay = policy.base_delay;
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if retryable(&err) && attempt < policy.max_attempts => {
                log::warn!(
                    "transient failure (attempt {attempt}/{}), retrying in {delay:?}: {err}",
                    policy.max_attempts
                );
                std::thread::sleep(delay);
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
