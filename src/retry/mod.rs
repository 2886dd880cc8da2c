//! Rate-limit-aware retry execution for unreliable remote calls.
//!
//! [`RetryExecutor`] runs a zero-argument operation up to
//! `policy.max_retries()` times:
//! - attempt 0 runs immediately; every later attempt is preceded by an
//!   exponential backoff wait with jitter.
//! - a rate-limited failure additionally waits
//!   `max(hint, policy.rate_limit_delay())` before the loop continues.
//! - the final attempt never waits after failing; the last classified error
//!   is returned inside [`RetryError::Exhausted`].
//!
//! Every wait goes through a [`Sleeper`] (or [`BlockingSleep`] for
//! [`RetryExecutor::execute_blocking`]) so callers and tests can swap the
//! clock out.

mod backoff;
mod classify;
mod policy;
mod sleep;

pub use backoff::{compute_backoff_delay, compute_backoff_delay_with, Jitter, NoJitter, ThreadRngJitter};
pub use classify::{extract_retry_delay, Classify, ErrorClass, ErrorRecord};
pub use policy::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_SECS, DEFAULT_JITTER_MAX_SECS,
    DEFAULT_MAX_DELAY_SECS, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_DELAY_SECS,
};
pub use sleep::{BlockingSleep, Sleeper, ThreadSleeper, TokioSleeper};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// RetryError
// ---------------------------------------------------------------------------

/// Terminal outcome of a retry session that never succeeded.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt in the budget failed.
    Exhausted {
        attempts: u32,
        /// Classified view of the final failure.
        last: ErrorRecord,
        /// The final failure as returned by the operation.
        source: E,
    },
    /// The loop finished without observing an error. Unreachable while the
    /// budget is at least one attempt.
    NoAttempts { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::NoAttempts { attempts } => *attempts,
        }
    }

    /// Classified view of the final failure, if one was observed.
    pub fn last_error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::NoAttempts { .. } => None,
        }
    }

    /// True when the budget ran out while the service was still rate-limiting.
    pub fn is_rate_limited(&self) -> bool {
        self.last_error().is_some_and(ErrorRecord::is_rate_limited)
    }
}

impl<E> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts, last, .. } => write!(
                f,
                "retry budget exhausted after {attempts} attempts; last error ({}): {}",
                last.class, last.message
            ),
            Self::NoAttempts { attempts } => write!(
                f,
                "operation failed after {attempts} attempts without reporting an error"
            ),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { source, .. } => Some(source),
            Self::NoAttempts { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RetryExecutor
// ---------------------------------------------------------------------------

/// Runs remote operations under a [`RetryPolicy`].
///
/// Cloning is cheap; clones share the sleeper and jitter source but each
/// `execute` call keeps its own attempt state.
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    blocking_sleeper: Arc<dyn BlockingSleep>,
    jitter: Arc<dyn Jitter>,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            blocking_sleeper: Arc::new(ThreadSleeper),
            jitter: Arc::new(ThreadRngJitter),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_blocking_sleeper(mut self, sleeper: Arc<dyn BlockingSleep>) -> Self {
        self.blocking_sleeper = sleeper;
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify,
    {
        let mut state = AttemptState::new();
        for attempt in 0..self.policy.max_retries() {
            if let Some(delay) = self.pre_attempt_delay(attempt, &state) {
                self.sleeper.sleep(delay).await;
            }
            state.attempts = attempt + 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let wait = self.record_failure(attempt, &mut state, err);
                    if let Some(delay) = wait {
                        self.sleeper.sleep(delay).await;
                    }
                }
            }
        }
        Err(self.exhausted(state))
    }

    /// Blocking twin of [`execute`](Self::execute) with identical timing.
    pub fn execute_blocking<T, E, F>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Classify,
    {
        let mut state = AttemptState::new();
        for attempt in 0..self.policy.max_retries() {
            if let Some(delay) = self.pre_attempt_delay(attempt, &state) {
                self.blocking_sleeper.sleep(delay);
            }
            state.attempts = attempt + 1;
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if let Some(delay) = self.record_failure(attempt, &mut state, err) {
                        self.blocking_sleeper.sleep(delay);
                    }
                }
            }
        }
        Err(self.exhausted(state))
    }

    fn pre_attempt_delay<E>(&self, attempt: u32, state: &AttemptState<E>) -> Option<Duration> {
        if attempt == 0 {
            return None;
        }
        if state.last_rate_limited() && !self.policy.backoff_after_rate_limit() {
            return None;
        }
        let delay = compute_backoff_delay_with(attempt, &self.policy, self.jitter.as_ref());
        info!(
            attempt = attempt + 1,
            max_attempts = self.policy.max_retries(),
            "waiting {:.2}s before retrying to avoid rate limits",
            delay.as_secs_f64()
        );
        Some(delay)
    }

    /// Classify a failure, store it, and return the post-failure wait.
    fn record_failure<E: Classify>(
        &self,
        attempt: u32,
        state: &mut AttemptState<E>,
        err: E,
    ) -> Option<Duration> {
        let record = ErrorRecord::from_error(&err);
        let max_attempts = self.policy.max_retries();
        let is_final = self.policy.is_final_attempt(attempt);

        let wait = if record.is_rate_limited() {
            warn!(
                attempt = attempt + 1,
                max_attempts,
                "rate limit hit: {}",
                record.message
            );
            if is_final {
                None
            } else {
                let delay = self.policy.rate_limit_wait(record.suggested_delay);
                info!(
                    hinted_secs = record.suggested_delay.map(|hint| hint.as_secs()),
                    "rate limit detected; waiting {:.0}s",
                    delay.as_secs_f64()
                );
                Some(delay)
            }
        } else {
            warn!(
                attempt = attempt + 1,
                max_attempts,
                class = %record.class,
                "remote call failed: {}",
                record.message
            );
            None
        };

        state.last = Some((record, err));
        wait
    }

    fn exhausted<E>(&self, state: AttemptState<E>) -> RetryError<E> {
        let attempts = state.attempts;
        match state.last {
            Some((last, source)) => {
                error!(
                    attempts,
                    class = %last.class,
                    "retry budget exhausted: {}",
                    last.message
                );
                RetryError::Exhausted {
                    attempts,
                    last,
                    source,
                }
            }
            None => {
                error!(attempts, "retry loop ended without a recorded error");
                RetryError::NoAttempts { attempts }
            }
        }
    }
}

/// Mutable bookkeeping for a single `execute` call.
struct AttemptState<E> {
    attempts: u32,
    last: Option<(ErrorRecord, E)>,
}

impl<E> AttemptState<E> {
    fn new() -> Self {
        Self {
            attempts: 0,
            last: None,
        }
    }

    fn last_rate_limited(&self) -> bool {
        self.last
            .as_ref()
            .is_some_and(|(record, _)| record.is_rate_limited())
    }
}

/// Run `operation` with `policy` (or the built-in defaults) on the tokio
/// timer. Entry point for pipeline code that does not hold an executor.
pub async fn execute_with_retry<T, E, F, Fut>(
    operation: F,
    policy: Option<&RetryPolicy>,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify,
{
    RetryExecutor::new(policy.copied().unwrap_or_default())
        .execute(operation)
        .await
}
