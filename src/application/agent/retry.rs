//! Bounded retry around one fallible reasoning cycle.
//!
//! The operation is re-run from scratch on every attempt; nothing from a
//! failed attempt is rolled back. `attempt` numbers are 1-based.

use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

use super::errors::Classified;
use crate::config::DEFAULT_MAX_RETRIES;
use crate::domain::types::FailureKind;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
    /// Failure kinds that stop the envelope immediately.
    pub fatal_kinds: HashSet<FailureKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            delay: Duration::ZERO,
            fatal_kinds: HashSet::new(),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn fatal_on(mut self, kind: FailureKind) -> Self {
        self.fatal_kinds.insert(kind);
        self
    }

    fn is_fatal(&self, kind: FailureKind) -> bool {
        self.fatal_kinds.contains(&kind)
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
    #[error("attempt {attempt} failed with a non-retryable error: {error}")]
    Fatal { attempt: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Fatal { attempt, .. } => *attempt,
        }
    }

    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Fatal { error, .. } => error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    pub value: T,
    pub attempts: u32,
}

/// Runs `operation` until it succeeds or the policy runs out of attempts.
/// `on_failure` sees every failed attempt before the next one starts.
pub async fn retry_with_policy<F, Fut, T, E, H>(
    policy: &RetryPolicy,
    mut operation: F,
    mut on_failure: H,
) -> Result<RetryOutcome<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classified + Display,
    H: FnMut(u32, &E),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Operation succeeded after retry");
                }
                return Ok(RetryOutcome {
                    value,
                    attempts: attempt,
                });
            }
            Err(err) => {
                let kind = err.kind();
                warn!(attempt, kind = kind.as_str(), error = %err, "Attempt failed");
                on_failure(attempt, &err);

                if policy.is_fatal(kind) {
                    return Err(RetryError::Fatal {
                        attempt,
                        error: err,
                    });
                }
                if attempt >= max_attempts {
                    warn!(attempts = attempt, "Retry budget exhausted");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                if !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}
