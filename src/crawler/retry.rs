//! Reusable retry policy
//!
//! A [`RetryPolicy`] runs a fallible async operation up to a fixed number of
//! attempts, pausing for a randomized backoff between failed attempts. It is
//! shared by every retryable operation so the loop lives in one place.

use crate::crawler::DelayRange;
use std::fmt::Display;
use std::future::Future;

/// Attempt budget plus backoff range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Pause between a failed attempt and the next one
    pub backoff: DelayRange,
}

/// The operation failed on every attempt
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: DelayRange) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `operation` until it succeeds or the budget is spent
    ///
    /// The closure receives the 1-based attempt number. No pause follows the
    /// final failed attempt. A budget of zero is treated as one attempt.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                Err(error) => {
                    tracing::debug!(
                        "Attempt {}/{} failed: {}; backing off",
                        attempt,
                        max_attempts,
                        error
                    );
                    self.backoff.pause().await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, DelayRange::from_millis(1000, 2000))
    }
}
